use std::sync::Arc;

use crate::model::{
    constants::SM5_BASE_POINTS,
    events::{codes, GameEvent},
    game::Game,
    modes::{
        builtin::default_settings, lasermaxx::count_vendor_event, registry::GameModeRegistry, CustomEventsMode,
        GameModeRow, GameModeVariant, ModeInfo
    },
    scoring::{ScoringEngine, ScoringScope},
    structures::{game_type::GameType, system::System}
};

/// Space Marines 5: team deathmatch where missiles, nukes and destroyed
/// bases add to the score.
#[derive(Debug)]
pub struct Sm5 {
    info: ModeInfo
}

impl Sm5 {
    pub fn build(system: Option<System>, row: Option<&GameModeRow>) -> Arc<dyn GameModeVariant> {
        Arc::new(Sm5 {
            info: ModeInfo::new(system, "SM5", GameType::Team, row, default_settings(system))
        })
    }
}

impl GameModeVariant for Sm5 {
    fn info(&self) -> &ModeInfo {
        &self.info
    }

    fn recalculate_scores(&self, game: &mut Game) {
        ScoringEngine::recalculate(game, ScoringScope::Full);
        for player in game.players.iter_mut() {
            player.score += player.bases_destroyed as i64 * SM5_BASE_POINTS;
        }
        game.recompute_team_scores();
    }

    fn as_custom_events(&self) -> Option<&dyn CustomEventsMode> {
        Some(self)
    }
}

impl CustomEventsMode for Sm5 {
    fn process_event(&self, game: &mut Game, event: &GameEvent) -> bool {
        count_vendor_event(game, event, codes::BASE_DESTROYED, |p| p.bases_destroyed += 1)
    }
}

pub fn register_laserforce(registry: &mut GameModeRegistry) {
    registry.register(Some(System::LaserForce), "SM5", GameType::Team, Sm5::build);
}

#[cfg(test)]
mod tests {
    use super::Sm5;
    use crate::{
        model::{
            events::{apply_event, codes, GameEvent},
            game::{VendorCounters, Winner},
            structures::{system::System, team_color::TeamColor}
        },
        utils::test_utils::generate_team_game
    };

    #[test]
    fn test_sm5_scoring() {
        let mode = Sm5::build(Some(System::LaserForce), None);
        let mut game = generate_team_game(System::LaserForce, 2, 1);
        game.players[0].hits_other = 3;
        game.players[1].hits_other = 4;
        if let VendorCounters::LaserForce(c) = &mut game.players[0].counters {
            c.nukes = 1;
        }
        game.normalize_counters();

        let base = GameEvent::Vendor {
            time_ms: 60_000,
            code: codes::BASE_DESTROYED.to_string(),
            actors: vec![1]
        };
        assert!(apply_event(&mut game, Some(mode.as_ref()), &base));

        mode.recalculate_scores(&mut game);

        assert_eq!(game.players[0].score, 300 + 500 + 1001);
        assert_eq!(game.players[1].score, 400);
        assert_eq!(game.team(TeamColor::Red).unwrap().score, 1801);
        assert_eq!(mode.get_win(&game), Some(Winner::Team(TeamColor::Red)));

        // Scores only depend on counters
        mode.recalculate_scores(&mut game);
        assert_eq!(game.players[0].score, 1801);
    }
}
