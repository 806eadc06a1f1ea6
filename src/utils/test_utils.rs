use crate::{
    error::RegressionError,
    model::{
        baseline_store::{MemoryBaselineCache, StatBaselineStore},
        game::{Game, Player, Team, VestId},
        modes::GameModeRow,
        regression::{BaselineQuery, HistoricalStatSource, RawStatRow, RegressionStatEngine, StatRow},
        structures::{
            game_type::GameType, mode_settings::ModeSettings, statistic::Statistic, system::System,
            team_color::TeamColor
        }
    }
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc
};
use strum::IntoEnumIterator;

pub fn generate_player(system: System, vest: VestId, team: Option<TeamColor>) -> Player {
    Player::new(system, vest, &format!("Player {}", vest), team)
}

/// Solo game with one player per `(shots, hits, deaths)` entry, vests
/// numbered from 1. Timestamps are unset so the planned length applies.
pub fn generate_solo_game(system: System, players: &[(u32, u32, u32)]) -> Game {
    let mut game = Game::new("g-solo", system, GameType::Solo, "Deathmatch");

    for (i, (shots, hits, deaths)) in players.iter().enumerate() {
        let mut player = generate_player(system, i as VestId + 1, None);
        player.shots = *shots;
        player.hits = *hits;
        player.deaths = *deaths;
        game.players.push(player);
    }

    game
}

/// Team game with `n_teams` teams of `per_team` zeroed players. Teams are
/// assigned in color order and vests are numbered team by team from 1.
pub fn generate_team_game(system: System, n_teams: usize, per_team: usize) -> Game {
    let mut game = Game::new("g-team", system, GameType::Team, "Team deathmatch");

    for (team_idx, color) in TeamColor::iter().take(n_teams).enumerate() {
        game.teams.push(Team::new(color));
        for i in 0..per_team {
            let vest = (team_idx * per_team + i + 1) as VestId;
            game.players.push(generate_player(system, vest, Some(color)));
        }
    }

    game
}

pub fn generate_mode_row(id: i64, name: &str, game_type: GameType, rankable: bool) -> GameModeRow {
    GameModeRow {
        id,
        name: name.to_string(),
        systems: None,
        game_type,
        rankable,
        settings: ModeSettings::default()
    }
}

pub fn generate_raw_row(statistic: Statistic, enemies: u32, teammates: u32, game_length: f64, value: f64) -> RawStatRow {
    RawStatRow {
        arena: None,
        mode: None,
        rankable: true,
        game_type: GameType::Solo,
        team_count: 0,
        statistic,
        enemies,
        teammates,
        game_length,
        value
    }
}

/// Noisy, roughly linear statistic rows. Seeded for reproducible results.
pub fn generate_stat_rows(n: usize, seed: u64) -> Vec<StatRow> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    (0..n)
        .map(|_| {
            let enemies = rng.random_range(1..=12);
            let teammates = rng.random_range(0..=5);
            let game_length = rng.random_range(8.0..=20.0);
            let noise = rng.random_range(-2.0..=2.0);

            StatRow {
                enemies,
                teammates,
                game_length,
                value: 3.0 + 2.5 * enemies as f64 + 0.8 * teammates as f64 + 1.5 * game_length + noise
            }
        })
        .collect()
}

/// History that answers every query with the same rows.
pub struct FixedHistory {
    rows: Vec<StatRow>,
    calls: AtomicUsize
}

impl FixedHistory {
    pub fn new(rows: Vec<StatRow>) -> FixedHistory {
        FixedHistory {
            rows,
            calls: AtomicUsize::new(0)
        }
    }

    /// Number of queries answered so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl HistoricalStatSource for FixedHistory {
    fn rows(&self, _query: &BaselineQuery) -> Result<Vec<StatRow>, RegressionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.rows.clone())
    }
}

/// Store without any history, so every statistic uses the vendor fallback.
pub fn empty_baselines() -> StatBaselineStore {
    StatBaselineStore::new(
        RegressionStatEngine::new(Arc::new(FixedHistory::new(vec![]))),
        Arc::new(MemoryBaselineCache::new())
    )
}
