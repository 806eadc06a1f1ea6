use std::sync::Arc;

use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::model::{
    constants::{LASERBALL_GOAL_POINTS, SURVIVOR_BONUS},
    events::{codes, GameEvent},
    game::{Game, Player, Winner},
    modes::{
        builtin::default_settings, default_win, registry::GameModeRegistry, unique_max, CustomEventsMode,
        CustomLoadMode, GameLoad, GameModeRow, GameModeVariant, ModeInfo, ModifyResultsMode
    },
    scoring::{ScoringEngine, ScoringScope},
    structures::{game_type::GameType, system::System, team_color::TeamColor}
};

/// Teams with lives left win. With several (or no) teams alive the one
/// with the most hits among them wins.
#[derive(Debug)]
pub struct Csgo {
    info: ModeInfo
}

/// Destroying the enemy base is what counts.
#[derive(Debug)]
pub struct Zakladny {
    info: ModeInfo
}

/// Solo elimination with limited ammo, survivors get a bonus.
#[derive(Debug)]
pub struct Survival {
    info: ModeInfo
}

#[derive(Debug)]
pub struct TeamSurvival {
    info: ModeInfo
}

/// Teams are drawn randomly right before the game.
#[derive(Debug)]
pub struct Barvicky {
    info: ModeInfo
}

/// Solo game where every vest shares one team color.
#[derive(Debug)]
pub struct TSolo {
    info: ModeInfo
}

/// Ball sport: goals decide the game.
#[derive(Debug)]
pub struct Laserball {
    info: ModeInfo
}

fn info(system: Option<System>, name: &str, game_type: GameType, row: Option<&GameModeRow>) -> ModeInfo {
    ModeInfo::new(system, name, game_type, row, default_settings(system))
}

impl Csgo {
    pub fn build(system: Option<System>, row: Option<&GameModeRow>) -> Arc<dyn GameModeVariant> {
        Arc::new(Csgo {
            info: info(system, "CSGO", GameType::Team, row)
        })
    }
}

impl Zakladny {
    pub fn build(system: Option<System>, row: Option<&GameModeRow>) -> Arc<dyn GameModeVariant> {
        Arc::new(Zakladny {
            info: info(system, "Zakladny", GameType::Team, row)
        })
    }
}

impl Survival {
    pub fn build(system: Option<System>, row: Option<&GameModeRow>) -> Arc<dyn GameModeVariant> {
        Arc::new(Survival {
            info: info(system, "Survival", GameType::Solo, row)
        })
    }
}

impl TeamSurvival {
    pub fn build(system: Option<System>, row: Option<&GameModeRow>) -> Arc<dyn GameModeVariant> {
        Arc::new(TeamSurvival {
            info: info(system, "TeamSurvival", GameType::Team, row)
        })
    }
}

impl Barvicky {
    pub fn build(system: Option<System>, row: Option<&GameModeRow>) -> Arc<dyn GameModeVariant> {
        Arc::new(Barvicky {
            info: info(system, "Barvicky", GameType::Team, row)
        })
    }
}

impl TSolo {
    pub fn build(system: Option<System>, row: Option<&GameModeRow>) -> Arc<dyn GameModeVariant> {
        Arc::new(TSolo {
            info: info(system, "TSolo", GameType::Solo, row)
        })
    }
}

impl Laserball {
    pub fn build(system: Option<System>, row: Option<&GameModeRow>) -> Arc<dyn GameModeVariant> {
        Arc::new(Laserball {
            info: info(system, "Laserball", GameType::Team, row)
        })
    }
}

impl GameModeVariant for Csgo {
    fn info(&self) -> &ModeInfo {
        &self.info
    }

    fn get_win(&self, game: &Game) -> Option<Winner> {
        if game.players.iter().all(|p| p.lives_rest.is_none()) {
            return default_win(game, true);
        }

        let playing: Vec<TeamColor> = game
            .teams
            .iter()
            .map(|t| t.color)
            .filter(|c| game.team_players(*c).next().is_some())
            .collect();
        let alive: Vec<TeamColor> = playing.iter().copied().filter(|c| game.team_lives(*c) > 0).collect();

        if let [only] = alive.as_slice() {
            return Some(Winner::Team(*only));
        }

        let candidates = if alive.is_empty() { playing } else { alive };
        unique_max(candidates.into_iter().map(|c| (c, game.team_hits(c) as i64))).map(Winner::Team)
    }
}

impl GameModeVariant for Zakladny {
    fn info(&self) -> &ModeInfo {
        &self.info
    }

    fn get_win(&self, game: &Game) -> Option<Winner> {
        let bases = game
            .teams
            .iter()
            .map(|t| (t.color, game.team_bases_destroyed(t.color) as i64));

        match unique_max(bases) {
            Some(color) if game.team_bases_destroyed(color) > 0 => Some(Winner::Team(color)),
            _ => default_win(game, true)
        }
    }

    fn recalculate_scores(&self, game: &mut Game) {
        ScoringEngine::recalculate(game, ScoringScope::Full);
    }

    fn as_custom_events(&self) -> Option<&dyn CustomEventsMode> {
        Some(self)
    }
}

impl CustomEventsMode for Zakladny {
    fn process_event(&self, game: &mut Game, event: &GameEvent) -> bool {
        count_vendor_event(game, event, codes::BASE_DESTROYED, |p| p.bases_destroyed += 1)
    }
}

/// Remaining ammo is whatever the vest started with minus what it fired.
fn settle_survival_ammo(game: &mut Game) {
    let Some(start_ammo) = game.start_ammo else {
        return;
    };

    for player in game.players.iter_mut() {
        player.ammo_rest = Some(start_ammo.saturating_sub(player.shots));
    }
}

fn add_survivor_bonus(game: &mut Game) {
    for player in game.players.iter_mut() {
        if player.lives_rest.is_some_and(|lives| lives > 0) {
            player.score += SURVIVOR_BONUS;
        }
    }
}

impl GameModeVariant for Survival {
    fn info(&self) -> &ModeInfo {
        &self.info
    }

    fn recalculate_scores(&self, game: &mut Game) {
        ScoringEngine::recalculate(game, ScoringScope::Full);
    }

    fn as_modify_results(&self) -> Option<&dyn ModifyResultsMode> {
        Some(self)
    }
}

impl ModifyResultsMode for Survival {
    fn settle_ammo(&self, game: &mut Game) {
        settle_survival_ammo(game);
    }

    fn modify_results(&self, game: &mut Game) {
        add_survivor_bonus(game);
    }
}

impl GameModeVariant for TeamSurvival {
    fn info(&self) -> &ModeInfo {
        &self.info
    }

    fn recalculate_scores(&self, game: &mut Game) {
        ScoringEngine::recalculate(game, ScoringScope::Full);
    }

    fn as_modify_results(&self) -> Option<&dyn ModifyResultsMode> {
        Some(self)
    }
}

impl ModifyResultsMode for TeamSurvival {
    fn settle_ammo(&self, game: &mut Game) {
        settle_survival_ammo(game);
    }

    fn modify_results(&self, game: &mut Game) {
        add_survivor_bonus(game);
    }
}

impl GameModeVariant for Barvicky {
    fn info(&self) -> &ModeInfo {
        &self.info
    }

    fn recalculate_scores(&self, game: &mut Game) {
        ScoringEngine::recalculate(game, ScoringScope::Full);
    }

    fn as_custom_load(&self) -> Option<&dyn CustomLoadMode> {
        Some(self)
    }
}

impl CustomLoadMode for Barvicky {
    /// Shuffles the players with the load seed and deals them to the teams
    /// round-robin, so team sizes differ by at most one.
    fn prepare_load(&self, load: &mut GameLoad) {
        if load.teams.is_empty() {
            load.teams = vec![TeamColor::Red, TeamColor::Green];
        }

        let mut rng = ChaCha8Rng::seed_from_u64(load.seed);
        let mut order: Vec<usize> = (0..load.players.len()).collect();
        order.shuffle(&mut rng);

        for (i, index) in order.into_iter().enumerate() {
            load.players[index].team = Some(load.teams[i % load.teams.len()]);
        }
    }
}

impl GameModeVariant for TSolo {
    fn info(&self) -> &ModeInfo {
        &self.info
    }

    fn recalculate_scores(&self, game: &mut Game) {
        ScoringEngine::recalculate(game, ScoringScope::Full);
    }

    fn as_custom_load(&self) -> Option<&dyn CustomLoadMode> {
        Some(self)
    }
}

impl CustomLoadMode for TSolo {
    fn prepare_load(&self, load: &mut GameLoad) {
        let color = load.teams.first().copied().unwrap_or(TeamColor::Red);
        load.teams = vec![color];
        for player in load.players.iter_mut() {
            player.team = Some(color);
        }
    }
}

impl GameModeVariant for Laserball {
    fn info(&self) -> &ModeInfo {
        &self.info
    }

    /// Most goals wins, equal goals are a draw.
    fn get_win(&self, game: &Game) -> Option<Winner> {
        let goals = game
            .teams
            .iter()
            .filter(|t| game.team_players(t.color).next().is_some())
            .map(|t| (t.color, game.team_goals(t.color) as i64));

        unique_max(goals).map(Winner::Team)
    }

    fn as_modify_results(&self) -> Option<&dyn ModifyResultsMode> {
        Some(self)
    }

    fn as_custom_events(&self) -> Option<&dyn CustomEventsMode> {
        Some(self)
    }
}

impl ModifyResultsMode for Laserball {
    fn modify_results(&self, game: &mut Game) {
        for player in game.players.iter_mut() {
            player.score += player.goals as i64 * LASERBALL_GOAL_POINTS;
        }
    }
}

impl CustomEventsMode for Laserball {
    fn process_event(&self, game: &mut Game, event: &GameEvent) -> bool {
        count_vendor_event(game, event, codes::BALL_GOAL, |p| p.goals += 1)
    }
}

/// Applies `update` to the acting player of a vendor event with `code`.
pub(crate) fn count_vendor_event(
    game: &mut Game,
    event: &GameEvent,
    code: &str,
    update: impl FnOnce(&mut Player)
) -> bool {
    if event.code() != Some(code) {
        return false;
    }

    match event.actor().and_then(|vest| game.player_mut(vest)) {
        Some(player) => {
            update(player);
            true
        }
        None => false
    }
}

/// LaserMaxx modes, available on Evo5 and Evo6.
pub fn register_lasermaxx(registry: &mut GameModeRegistry) {
    for system in [System::Evo5, System::Evo6] {
        let system = Some(system);
        registry.register(system, "CSGO", GameType::Team, Csgo::build);
        registry.register(system, "Zakladny", GameType::Team, Zakladny::build);
        registry.register(system, "Survival", GameType::Solo, Survival::build);
        registry.register(system, "TeamSurvival", GameType::Team, TeamSurvival::build);
        registry.register(system, "Barvicky", GameType::Team, Barvicky::build);
        registry.register(system, "TSolo", GameType::Solo, TSolo::build);
        registry.register(system, "Laserball", GameType::Team, Laserball::build);
    }
}

#[cfg(test)]
mod tests {
    use super::{Barvicky, Csgo, Laserball, Survival, TSolo, Zakladny};
    use crate::{
        model::{
            events::{apply_event, codes, GameEvent},
            game::Winner,
            modes::{GameLoad, LoadPlayer},
            structures::{system::System, team_color::TeamColor}
        },
        utils::test_utils::{generate_solo_game, generate_team_game}
    };
    use itertools::Itertools;

    fn goal(vest: u32) -> GameEvent {
        GameEvent::Vendor {
            time_ms: 0,
            code: codes::BALL_GOAL.to_string(),
            actors: vec![vest]
        }
    }

    fn load(players: u32, teams: Vec<TeamColor>) -> GameLoad {
        GameLoad {
            seed: 42,
            teams,
            players: (1..=players)
                .map(|vest| LoadPlayer {
                    vest,
                    name: format!("Player {}", vest),
                    team: None
                })
                .collect()
        }
    }

    #[test]
    fn test_csgo_last_team_alive_wins() {
        let mode = Csgo::build(Some(System::Evo5), None);
        let mut game = generate_team_game(System::Evo5, 2, 2);
        game.players[0].lives_rest = Some(0);
        game.players[1].lives_rest = Some(0);
        game.players[2].lives_rest = Some(1);
        game.players[3].lives_rest = Some(0);
        // Red has more hits but no lives left
        game.players[0].hits = 30;

        assert_eq!(mode.get_win(&game), Some(Winner::Team(TeamColor::Green)));
    }

    #[test]
    fn test_csgo_several_alive_fall_back_to_hits() {
        let mode = Csgo::build(Some(System::Evo5), None);
        let mut game = generate_team_game(System::Evo5, 3, 1);
        game.players[0].lives_rest = Some(2);
        game.players[0].hits = 4;
        game.players[1].lives_rest = Some(1);
        game.players[1].hits = 9;
        game.players[2].lives_rest = Some(0);
        game.players[2].hits = 20;

        assert_eq!(mode.get_win(&game), Some(Winner::Team(TeamColor::Green)));

        game.players[0].hits = 9;
        assert_eq!(mode.get_win(&game), None);
    }

    #[test]
    fn test_csgo_without_lives_uses_score() {
        let mode = Csgo::build(Some(System::Evo6), None);
        let mut game = generate_team_game(System::Evo6, 2, 1);
        game.players[1].score = 100;

        assert_eq!(mode.get_win(&game), Some(Winner::Team(TeamColor::Green)));
    }

    #[test]
    fn test_zakladny_bases() {
        let mode = Zakladny::build(Some(System::Evo5), None);
        let mut game = generate_team_game(System::Evo5, 2, 1);
        let event = GameEvent::Vendor {
            time_ms: 1000,
            code: codes::BASE_DESTROYED.to_string(),
            actors: vec![2]
        };

        assert!(apply_event(&mut game, Some(mode.as_ref()), &event));
        game.players[0].score = 500;

        assert_eq!(game.player(2).unwrap().bases_destroyed, 1);
        assert_eq!(mode.get_win(&game), Some(Winner::Team(TeamColor::Green)));

        game.players[0].bases_destroyed = 1;
        assert_eq!(mode.get_win(&game), Some(Winner::Team(TeamColor::Red)));
    }

    #[test]
    fn test_survival_hooks_are_split() {
        let mode = Survival::build(Some(System::Evo5), None);
        let hooks = mode.as_modify_results().unwrap();
        let mut game = generate_solo_game(System::Evo5, &[(120, 10, 2), (300, 15, 5)]);
        game.start_ammo = Some(200);
        game.players[0].lives_rest = Some(3);
        game.players[1].lives_rest = Some(0);

        hooks.settle_ammo(&mut game);
        assert_eq!(game.players[0].ammo_rest, Some(80));
        assert_eq!(game.players[1].ammo_rest, Some(0));
        assert_eq!(game.players[0].score, 0);

        game.normalize_counters();
        mode.recalculate_scores(&mut game);
        let before = game.players[0].score;
        hooks.modify_results(&mut game);

        assert_eq!(game.players[0].score, before + 1000);
        assert_eq!(game.players[1].score, 15 * 100 - 5 * 30);
    }

    #[test]
    fn test_barvicky_balances_teams() {
        let mode = Barvicky::build(Some(System::Evo5), None);
        let mut first = load(7, vec![TeamColor::Red, TeamColor::Green, TeamColor::Blue]);
        let mut second = first.clone();

        mode.as_custom_load().unwrap().prepare_load(&mut first);
        mode.as_custom_load().unwrap().prepare_load(&mut second);

        assert_eq!(first, second);
        let sizes = first.players.iter().counts_by(|p| p.team);
        assert_eq!(sizes.len(), 3);
        assert!(sizes.values().all(|count| *count == 2 || *count == 3));
    }

    #[test]
    fn test_tsolo_single_team() {
        let mode = TSolo::build(Some(System::Evo6), None);
        let mut game_load = load(4, vec![]);

        mode.as_custom_load().unwrap().prepare_load(&mut game_load);

        assert_eq!(game_load.teams, vec![TeamColor::Red]);
        assert!(game_load.players.iter().all(|p| p.team == Some(TeamColor::Red)));
    }

    #[test]
    fn test_laserball() {
        let mode = Laserball::build(Some(System::Evo5), None);
        let mut game = generate_team_game(System::Evo5, 2, 2);

        apply_event(&mut game, Some(mode.as_ref()), &goal(1));
        apply_event(&mut game, Some(mode.as_ref()), &goal(3));
        assert_eq!(mode.get_win(&game), None);

        apply_event(&mut game, Some(mode.as_ref()), &goal(4));
        assert_eq!(mode.get_win(&game), Some(Winner::Team(TeamColor::Green)));

        mode.recalculate_scores(&mut game);
        mode.as_modify_results().unwrap().modify_results(&mut game);
        assert_eq!(game.player(4).unwrap().score, 500);
    }
}
