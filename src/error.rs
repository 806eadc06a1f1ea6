use crate::model::structures::{game_type::GameType, system::System};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegressionError {
    #[error("Not enough historical data to fit a baseline: {rows} rows, at least {required} required")]
    InsufficientData { rows: usize, required: usize },

    #[error("Failed to solve least squares system: {0}")]
    Solve(String),

    #[error("Failed to read historical rows: {0}")]
    Source(String)
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to (de)serialize stored data: {0}")]
    Serialization(#[from] serde_json::Error)
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("No game mode could be resolved for '{name}' ({game_type}) on {systems:?}")]
    GameModeNotFound {
        name: String,
        game_type: GameType,
        systems: Vec<System>
    },

    #[error("Game {code} has no resolved mode")]
    ModeNotResolved { code: String },

    #[error(transparent)]
    Regression(#[from] RegressionError),

    #[error(transparent)]
    Storage(#[from] StorageError)
}
