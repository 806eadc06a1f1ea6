use indicatif::{ProgressBar, ProgressStyle};
use tracing::Level;

/// Progress bar for long batch jobs. Returns `None` when INFO logging is
/// disabled, so quiet runs (tests, benches) draw nothing.
pub fn progress_bar(len: u64, msg: String) -> Option<ProgressBar> {
    if !tracing::enabled!(Level::INFO) {
        return None;
    }

    let bar = ProgressBar::new(len);
    if let Ok(style) =
        ProgressStyle::default_bar().template("[{elapsed_precise} / {eta_precise}] {bar:40.cyan/blue} {pos:>7}/{len:7} {msg}")
    {
        bar.set_style(style.progress_chars("##-"));
    }
    bar.set_message(msg);

    Some(bar)
}

