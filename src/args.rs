use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::model::structures::{game_type::GameType, system::System};

#[derive(Parser, Clone)]
#[command(
    display_name = "Laser tag results",
    long_about = "Scores finished laser tag games, estimates player skill and maintains the statistic baselines"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// JSON array of stored game modes. Without it every mode resolves by
    /// name only and counts as rankable.
    #[arg(short, long, env = "MODES_FILE", help = "Stored game modes (JSON)")]
    pub modes: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(
        short,
        long,
        env = "RUST_LOG",
        default_value = "info",
        value_parser = ["trace", "debug", "info", "warn", "error"],
        help = "Sets the logging verbosity"
    )]
    pub log_level: String
}

#[derive(Subcommand, Clone)]
pub enum Command {
    /// Refits every statistic baseline from the game history
    Recompute {
        /// Historical per-player rows (JSON). Defaults to HISTORY_FILE.
        #[arg(long)]
        history: Option<PathBuf>,

        /// Arenas to fit separately, next to the all-arena baseline.
        /// Defaults to every arena found in the history.
        #[arg(long, value_delimiter = ',')]
        arenas: Vec<i64>
    },

    /// Scores one game or an array of games and prints the results
    Process {
        /// Game (or array of games) as JSON
        game: PathBuf,

        /// Raw events to replay onto the game before scoring
        #[arg(long)]
        events: Option<PathBuf>
    },

    /// Applies a mode's team assignment rules to a game load
    Load {
        #[arg(long)]
        mode: String,

        #[arg(long)]
        system: System,

        #[arg(long, default_value = "TEAM")]
        game_type: GameType,

        /// Game load as JSON
        load: PathBuf
    }
}
