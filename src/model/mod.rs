//! Scoring, skill estimation and game-mode resolution for finished laser
//! tag games.

pub mod baseline_store;
pub mod constants;
pub mod events;
pub mod game;
pub mod modes;
pub mod pipeline;
pub mod player_stats;
pub mod regression;
pub mod scoring;
pub mod trophy;
pub mod vendor;

pub mod structures {
    pub mod feature_expansion;
    pub mod game_type;
    pub mod mode_settings;
    pub mod statistic;
    pub mod system;
    pub mod team_color;
}
