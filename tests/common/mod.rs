use std::sync::{Arc, Once};

use lasertag_results::{
    model::{modes::registry::GameModeRegistry, pipeline::ResultsPipeline},
    utils::test_utils::empty_baselines
};

static INIT: Once = Once::new();

/// Initialize test environment with RUST_LOG=WARN
pub fn init_test_env() {
    INIT.call_once(|| {
        std::env::set_var("RUST_LOG", "warn");
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    });
}

/// Pipeline with every builtin and vendor mode and no baseline history.
pub fn default_pipeline() -> ResultsPipeline {
    ResultsPipeline::new(Arc::new(GameModeRegistry::with_defaults()), Arc::new(empty_baselines()))
}
