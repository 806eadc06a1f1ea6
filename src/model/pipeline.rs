use std::sync::Arc;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    error::EngineError,
    model::{
        baseline_store::StatBaselineStore,
        events::{apply_events, GameEvent},
        game::{Game, VestId, Winner},
        modes::{registry::GameModeRegistry, GameLoad},
        player_stats::update_player_stats,
        structures::{game_type::GameType, system::System},
        trophy::{Trophy, TrophyEvaluator}
    }
};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlayerTrophies {
    pub vest: VestId,
    pub primary: Trophy,
    pub all: Vec<Trophy>
}

/// A fully scored copy of a game.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedGame {
    pub game: Game,
    /// `None` is a draw
    pub winner: Option<Winner>,
    pub trophies: Vec<PlayerTrophies>
}

/// Runs a finished game through scoring, derived stats, win resolution and
/// trophies.
pub struct ResultsPipeline {
    registry: Arc<GameModeRegistry>,
    baselines: Arc<StatBaselineStore>
}

impl ResultsPipeline {
    pub fn new(registry: Arc<GameModeRegistry>, baselines: Arc<StatBaselineStore>) -> ResultsPipeline {
        ResultsPipeline { registry, baselines }
    }

    pub fn registry(&self) -> &GameModeRegistry {
        &self.registry
    }

    /// Processes a copy of `game`; the input is never modified, so a failure
    /// leaves nothing half-scored behind.
    ///
    /// Steps, in order:
    /// 1. Resolve the mode and finalize raw counters (own/other split, ammo).
    /// 2. Recalculate scores, then apply the mode's result modifications.
    /// 3. Re-sum team scores and reorder positions.
    /// 4. Derive accuracy and skill against the stored baselines.
    /// 5. Determine the winner and award trophies.
    pub fn process(&self, game: &Game) -> Result<ProcessedGame, EngineError> {
        let mode = self.registry.resolve_game(game)?;

        let mut game = game.clone();
        game.mode.variant = Some(mode.id().to_string());
        if let Some(row) = mode.row() {
            game.mode.id = Some(row.id);
        }

        game.normalize_counters();
        let modify = mode.as_modify_results();
        if let Some(hooks) = modify {
            hooks.settle_ammo(&mut game);
        }

        mode.recalculate_scores(&mut game);
        if let Some(hooks) = modify {
            hooks.modify_results(&mut game);
        }
        game.recompute_team_scores();
        mode.reorder_game(&mut game);

        update_player_stats(&mut game, &self.baselines, mode.row());

        let winner = mode.get_win(&game);
        let evaluator = TrophyEvaluator::new(&game, mode.settings());
        let trophies = game
            .players
            .iter()
            .map(|player| PlayerTrophies {
                vest: player.vest,
                primary: evaluator.get_one(player),
                all: evaluator.get_all(player)
            })
            .collect();

        debug!("Processed game {} as {} (winner: {:?})", game.code, mode.id(), winner);

        Ok(ProcessedGame { game, winner, trophies })
    }

    /// Processes games independently, in parallel. Results keep the input
    /// order and one failure does not affect the others.
    pub fn process_batch(&self, games: &[Game]) -> Vec<Result<ProcessedGame, EngineError>> {
        games
            .par_iter()
            .map(|game| {
                let result = self.process(game);
                if let Err(e) = &result {
                    warn!("Failed to process game {}: {}", game.code, e);
                }
                result
            })
            .collect()
    }

    /// Replays raw events onto the game's counters, routing mode specific
    /// codes to the resolved mode. Returns the number of handled events.
    pub fn replay_events(&self, game: &mut Game, events: &[GameEvent]) -> Result<usize, EngineError> {
        let mode = self.registry.resolve_game(game)?;
        Ok(apply_events(game, Some(mode.as_ref()), events))
    }

    /// Lets the mode rearrange the initial team assignment before a game.
    pub fn prepare_load(
        &self,
        mode_name: &str,
        system: System,
        game_type: GameType,
        load: &mut GameLoad
    ) -> Result<(), EngineError> {
        let mode = self.registry.resolve(mode_name, Some(&system.to_string()), game_type)?;
        if let Some(custom) = mode.as_custom_load() {
            custom.prepare_load(load);
        }

        Ok(())
    }
}
