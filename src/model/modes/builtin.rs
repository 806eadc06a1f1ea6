use std::sync::Arc;

use crate::model::{
    game::Game,
    modes::{registry::GameModeRegistry, GameModeRow, GameModeVariant, ModeInfo},
    scoring::{ScoringEngine, ScoringScope},
    structures::{game_type::GameType, mode_settings::ModeSettings, system::System}
};

pub const DEATHMATCH: &str = "Deathmatch";
pub const TEAM_DEATHMATCH: &str = "TeamDeathmatch";
pub const CUSTOM_SOLO: &str = "CustomSoloMode";
pub const CUSTOM_TEAM: &str = "CustomTeamMode";

/// Display settings a mode gets when no stored row overrides them.
pub fn default_settings(system: Option<System>) -> ModeSettings {
    match system {
        Some(s) if s.is_lasermaxx() => ModeSettings::with_mines(),
        _ => ModeSettings::default()
    }
}

/// Everyone against everyone, highest score wins.
#[derive(Debug)]
pub struct Deathmatch {
    info: ModeInfo
}

/// Team against team, highest team score wins.
#[derive(Debug)]
pub struct TeamDeathmatch {
    info: ModeInfo
}

/// A stored mode with no dedicated implementation, played solo.
#[derive(Debug)]
pub struct CustomSoloMode {
    info: ModeInfo
}

/// A stored mode with no dedicated implementation, played in teams.
#[derive(Debug)]
pub struct CustomTeamMode {
    info: ModeInfo
}

impl Deathmatch {
    pub fn build(system: Option<System>, row: Option<&GameModeRow>) -> Arc<dyn GameModeVariant> {
        Arc::new(Deathmatch {
            info: ModeInfo::new(system, DEATHMATCH, GameType::Solo, row, default_settings(system))
        })
    }
}

impl TeamDeathmatch {
    pub fn build(system: Option<System>, row: Option<&GameModeRow>) -> Arc<dyn GameModeVariant> {
        Arc::new(TeamDeathmatch {
            info: ModeInfo::new(system, TEAM_DEATHMATCH, GameType::Team, row, default_settings(system))
        })
    }
}

impl CustomSoloMode {
    pub fn build(system: Option<System>, row: Option<&GameModeRow>) -> Arc<dyn GameModeVariant> {
        let name = row.map(|r| r.name.as_str()).unwrap_or(CUSTOM_SOLO);
        Arc::new(CustomSoloMode {
            info: ModeInfo::new(system, name, GameType::Solo, row, default_settings(system))
        })
    }
}

impl CustomTeamMode {
    pub fn build(system: Option<System>, row: Option<&GameModeRow>) -> Arc<dyn GameModeVariant> {
        let name = row.map(|r| r.name.as_str()).unwrap_or(CUSTOM_TEAM);
        Arc::new(CustomTeamMode {
            info: ModeInfo::new(system, name, GameType::Team, row, default_settings(system))
        })
    }
}

impl GameModeVariant for Deathmatch {
    fn info(&self) -> &ModeInfo {
        &self.info
    }

    fn recalculate_scores(&self, game: &mut Game) {
        ScoringEngine::recalculate(game, ScoringScope::Full);
    }
}

impl GameModeVariant for TeamDeathmatch {
    fn info(&self) -> &ModeInfo {
        &self.info
    }

    fn recalculate_scores(&self, game: &mut Game) {
        ScoringEngine::recalculate(game, ScoringScope::Full);
    }
}

impl GameModeVariant for CustomSoloMode {
    fn info(&self) -> &ModeInfo {
        &self.info
    }

    fn recalculate_scores(&self, game: &mut Game) {
        ScoringEngine::recalculate(game, ScoringScope::Full);
    }
}

impl GameModeVariant for CustomTeamMode {
    fn info(&self) -> &ModeInfo {
        &self.info
    }

    fn recalculate_scores(&self, game: &mut Game) {
        ScoringEngine::recalculate(game, ScoringScope::Full);
    }
}

/// System independent modes, also used as the resolution fallback.
pub fn register_builtin(registry: &mut GameModeRegistry) {
    registry.register(None, DEATHMATCH, GameType::Solo, Deathmatch::build);
    registry.register(None, TEAM_DEATHMATCH, GameType::Team, TeamDeathmatch::build);
    registry.register(None, CUSTOM_SOLO, GameType::Solo, CustomSoloMode::build);
    registry.register(None, CUSTOM_TEAM, GameType::Team, CustomTeamMode::build);
}

#[cfg(test)]
mod tests {
    use super::{default_settings, CustomTeamMode, Deathmatch, TeamDeathmatch};
    use crate::{
        model::{
            game::Winner,
            modes::GameModeVariant,
            scoring::ScoringRules,
            structures::{game_type::GameType, system::System, team_color::TeamColor}
        },
        utils::test_utils::{generate_mode_row, generate_solo_game, generate_team_game}
    };

    #[test]
    fn test_deathmatch_example() {
        let mode = Deathmatch::build(Some(System::Evo5), None);
        let mut game = generate_solo_game(System::Evo5, &[(10, 5, 2), (10, 2, 5)]);
        game.scoring = ScoringRules {
            hit_other: 100,
            death_other: -50,
            shot: 0,
            ..ScoringRules::for_system(System::Evo5)
        };
        game.normalize_counters();

        mode.recalculate_scores(&mut game);
        mode.reorder_game(&mut game);

        assert_eq!(game.players[0].score, 400);
        assert_eq!(game.players[0].position, 1);
        assert_eq!(mode.get_win(&game), Some(Winner::Player(1)));
        assert!(mode.is_solo());
        assert_eq!(mode.id(), "evo5:Deathmatch");
    }

    #[test]
    fn test_team_deathmatch_counts_own_hits() {
        let mode = TeamDeathmatch::build(Some(System::Evo5), None);
        let mut game = generate_team_game(System::Evo5, 2, 1);
        game.players[0].hits_other = 2;
        game.players[0].hits_own = 1;
        game.players[1].hits_other = 2;
        game.normalize_counters();

        mode.recalculate_scores(&mut game);

        assert_eq!(game.players[0].score, 200 - 25);
        assert_eq!(mode.get_win(&game), Some(Winner::Team(TeamColor::Green)));
    }

    #[test]
    fn test_custom_mode_uses_row() {
        let mut row = generate_mode_row(12, "Hráči proti všem", GameType::Team, false);
        row.settings.best_hits = false;

        let mode = CustomTeamMode::build(Some(System::Evo6), Some(&row));

        assert_eq!(mode.name(), "Hráči proti všem");
        assert_eq!(mode.id(), "evo6:Hráči proti všem#12");
        assert!(!mode.settings().best_hits);
        assert!(!mode.is_rankable());
        assert!(mode.is_team());
    }

    #[test]
    fn test_default_settings() {
        assert!(default_settings(Some(System::Evo5)).mines);
        assert!(!default_settings(Some(System::LaserForce)).mines);
        assert!(!default_settings(None).mines);
    }
}
