use indexmap::IndexMap;
use tracing::debug;

use crate::model::{
    baseline_store::StatBaselineStore,
    constants::{
        REFERENCE_GAME_LENGTH, SKILL_ACCURACY_WEIGHT, SKILL_BONUS_WEIGHT, SKILL_HITS_WEIGHT, SKILL_KD_CAP,
        SKILL_KD_DEVIATION_CAP, SKILL_KD_DEVIATION_WEIGHT, SKILL_KD_WEIGHT, SKILL_TEAM_HITS_WEIGHT
    },
    game::{Game, Player, VestId},
    modes::GameModeRow,
    structures::{game_type::GameType, statistic::Statistic},
    vendor::profile
};

/// Hit percentage rounded to two decimals, 0 without shots.
pub fn accuracy_percent(hits: u32, shots: u32) -> f64 {
    if shots == 0 {
        return 0.0;
    }

    (100.0 * hits as f64 / shots as f64 * 100.0).round() / 100.0
}

/// Kill/death ratio. Team games only count enemy hits and deaths.
pub fn kd(game_type: GameType, player: &Player) -> f64 {
    let (hits, deaths) = match game_type {
        GameType::Solo => (player.hits, player.deaths),
        GameType::Team => (player.hits_other, player.deaths_other)
    };

    hits as f64 / deaths.max(1) as f64
}

/// The other player this vest hit the most. Hit records are scanned in order
/// and the first one encountered wins ties; nobody is returned when the vest
/// hit no one.
pub fn favourite_target(game: &Game, vest: VestId) -> Option<VestId> {
    most_frequent(
        game.hits
            .iter()
            .filter(|h| h.shooter == vest && h.target != vest)
            .map(|h| (h.target, h.count))
    )
}

/// The other player that hit this vest the most.
pub fn favourite_target_of(game: &Game, vest: VestId) -> Option<VestId> {
    most_frequent(
        game.hits
            .iter()
            .filter(|h| h.target == vest && h.shooter != vest)
            .map(|h| (h.shooter, h.count))
    )
}

fn most_frequent(records: impl Iterator<Item = (VestId, u32)>) -> Option<VestId> {
    // Keeps first-seen order when a pair shows up in several records
    let mut totals: IndexMap<VestId, u32> = IndexMap::new();
    for (other, count) in records {
        *totals.entry(other).or_insert(0) += count;
    }

    let mut best: Option<(VestId, u32)> = None;
    for (other, hits) in totals {
        if hits > 0 && best.map_or(true, |(_, current)| hits > current) {
            best = Some((other, hits));
        }
    }

    best.map(|(other, _)| other)
}

/// Derived per-player metrics of one game, evaluated against the stored
/// regression baselines.
pub struct PlayerStatModel<'a> {
    game: &'a Game,
    player: &'a Player,
    baselines: &'a StatBaselineStore,
    mode: Option<&'a GameModeRow>
}

impl<'a> PlayerStatModel<'a> {
    pub fn new(
        game: &'a Game,
        player: &'a Player,
        baselines: &'a StatBaselineStore,
        mode: Option<&'a GameModeRow>
    ) -> PlayerStatModel<'a> {
        PlayerStatModel {
            game,
            player,
            baselines,
            mode
        }
    }

    pub fn accuracy(&self) -> f64 {
        accuracy_percent(self.player.hits, self.player.shots)
    }

    pub fn kd(&self) -> f64 {
        kd(self.game.game_type, self.player)
    }

    fn game_length(&self) -> f64 {
        let length = self.game.game_length_minutes();
        if length > 0.0 {
            length
        } else {
            REFERENCE_GAME_LENGTH
        }
    }

    /// Evaluates the baseline of `statistic` for this player's game shape.
    /// Falls back to the vendor's constant formula when no baseline exists.
    pub fn expected(&self, statistic: Statistic) -> f64 {
        let game_type = self.game.game_type;
        let enemies = self.game.enemy_count(self.player) as f64;
        let teammates = self.game.teammate_count(self.player) as f64;
        let length = self.game_length();

        let model = self
            .baselines
            .get(statistic, game_type, self.mode, self.game.team_count(), self.game.arena)
            .unwrap_or_else(|e| {
                debug!("Using fallback {} baseline for game {}: {}", statistic, self.game.code, e);
                profile(self.game.system).fallback_baseline(statistic, game_type)
            });

        model.predict(enemies, teammates, length)
    }

    pub fn expected_average_hit_count(&self) -> f64 {
        self.expected(Statistic::Hits)
    }

    pub fn expected_average_death_count(&self) -> f64 {
        self.expected(Statistic::Deaths)
    }

    pub fn expected_average_team_hit_count(&self) -> f64 {
        self.expected(Statistic::HitsOwn)
    }

    pub fn expected_average_team_death_count(&self) -> f64 {
        self.expected(Statistic::DeathsOwn)
    }

    /// Skill from enemy hits, K:D and accuracy relative to the expected
    /// values, scaled down for games shorter than the reference length.
    pub fn base_skill(&self) -> f64 {
        let length = self.game_length();
        let expected_hits = positive_or_one(self.expected_average_hit_count());
        let expected_deaths = positive_or_one(self.expected_average_death_count());
        let kd = self.kd();

        let hits_part =
            SKILL_HITS_WEIGHT * (1.0 + (self.player.hits_other as f64 - expected_hits) / expected_hits);
        let kd_part = SKILL_KD_WEIGHT * kd.min(SKILL_KD_CAP);
        let kd_deviation_part = SKILL_KD_DEVIATION_WEIGHT
            * (kd - expected_hits / expected_deaths).clamp(-SKILL_KD_DEVIATION_CAP, SKILL_KD_DEVIATION_CAP);
        let accuracy_part = SKILL_ACCURACY_WEIGHT * self.accuracy();

        (hits_part + kd_part + kd_deviation_part + accuracy_part) * (length / REFERENCE_GAME_LENGTH).min(1.0)
    }

    /// Penalty for hitting teammates, never positive.
    pub fn team_hits_skill_adjustment(&self) -> f64 {
        if !self.game.game_type.is_team() {
            return 0.0;
        }

        let expected = positive_or_one(self.expected_average_team_hit_count());
        let ratio = 1.0 + (self.player.hits_own as f64 - expected) / expected;

        -(SKILL_TEAM_HITS_WEIGHT * ratio) * (REFERENCE_GAME_LENGTH / self.game_length())
    }

    pub fn bonus_skill_adjustment(&self) -> f64 {
        profile(self.game.system).bonus_count(self.player) as f64 * SKILL_BONUS_WEIGHT
    }

    pub fn calculate_skill(&self) -> i64 {
        (self.base_skill() + self.team_hits_skill_adjustment() + self.bonus_skill_adjustment()).round() as i64
    }
}

fn positive_or_one(value: f64) -> f64 {
    if value > 0.0 {
        value
    } else {
        1.0
    }
}

/// Stores accuracy and skill on every player. Scores must be final.
pub fn update_player_stats(game: &mut Game, baselines: &StatBaselineStore, mode: Option<&GameModeRow>) {
    for player in game.players.iter_mut() {
        player.accuracy = accuracy_percent(player.hits, player.shots);
    }

    let scored: &Game = game;
    let skills: Vec<i64> = scored
        .players
        .iter()
        .map(|player| PlayerStatModel::new(scored, player, baselines, mode).calculate_skill())
        .collect();

    for (player, skill) in game.players.iter_mut().zip(skills) {
        player.skill = skill;
    }
}
