use std::path::PathBuf;

use dotenv::dotenv;
use tracing::warn;

use crate::model::scoring::ScoringFieldMapping;

pub struct EngineSettings {
    pub history_path: Option<PathBuf>,
    pub baseline_cache_path: PathBuf,
    /// `None` lets rayon pick one thread per core
    pub worker_threads: Option<usize>,
    pub scoring_mapping: ScoringFieldMapping
}

pub fn get_env() -> EngineSettings {
    dotenv().ok(); // Load environment variables from .env file

    let history_path = std::env::var("HISTORY_FILE").ok().map(PathBuf::from);
    let baseline_cache_path = std::env::var("BASELINE_CACHE_FILE")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("baselines.json"));

    let worker_threads = std::env::var("WORKER_THREADS").ok().and_then(|value| match value.parse::<usize>() {
        Ok(0) => None,
        Ok(threads) => Some(threads),
        Err(_) => {
            warn!("Ignoring invalid WORKER_THREADS value '{}'", value);
            None
        }
    });

    let scoring_mapping = std::env::var("SCORING_FIELD_MAPPING")
        .ok()
        .map(|value| parse_scoring_mapping(&value))
        .unwrap_or_default();

    EngineSettings {
        history_path,
        baseline_cache_path,
        worker_threads,
        scoring_mapping
    }
}

fn parse_scoring_mapping(value: &str) -> ScoringFieldMapping {
    match value.trim().to_lowercase().as_str() {
        "legacy" => ScoringFieldMapping::Legacy,
        "corrected" => ScoringFieldMapping::Corrected,
        other => {
            warn!("Unknown SCORING_FIELD_MAPPING '{}', using corrected", other);
            ScoringFieldMapping::Corrected
        }
    }
}

/// Sizes the global rayon pool. Only the first call has an effect.
pub fn configure_threads(worker_threads: Option<usize>) {
    let Some(threads) = worker_threads else {
        return;
    };

    if let Err(e) = rayon::ThreadPoolBuilder::new().num_threads(threads).build_global() {
        warn!("Failed to configure {} worker threads: {}", threads, e);
    }
}
