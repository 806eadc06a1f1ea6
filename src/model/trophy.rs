use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

use crate::model::{
    constants::{
        TROPHY_FAVOURITE_MIN_COUNT, TROPHY_FAVOURITE_SHARE, TROPHY_FITNESS_MAX_LENGTH, TROPHY_FITNESS_SHOTS,
        TROPHY_HALF_ACCURACY, TROPHY_LOW_ACCURACY, TROPHY_SNIPER_ACCURACY, TROPHY_TEAM_MIN_PLAYERS,
        TROPHY_TEAM_SHARE, TROPHY_UNTOUCHABLE_DEATHS
    },
    game::{Game, Player, VestId},
    player_stats::{favourite_target, favourite_target_of, kd},
    structures::mode_settings::ModeSettings
};

/// Per-player game award. Serialized as the stable key display layers
/// translate.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Display, EnumString)]
pub enum Trophy {
    #[serde(rename = "100-percent")]
    #[strum(serialize = "100-percent")]
    HundredPercent,
    #[serde(rename = "zero-deaths")]
    #[strum(serialize = "zero-deaths")]
    ZeroDeaths,
    #[serde(rename = "devil")]
    #[strum(serialize = "devil")]
    Devil,
    #[serde(rename = "not-found")]
    #[strum(serialize = "not-found")]
    NotFound,
    #[serde(rename = "not-found-shots")]
    #[strum(serialize = "not-found-shots")]
    NotFoundShots,
    #[serde(rename = "fitness")]
    #[strum(serialize = "fitness")]
    Fitness,
    #[serde(rename = "best")]
    #[strum(serialize = "best")]
    Best,
    #[serde(rename = "hits")]
    #[strum(serialize = "hits")]
    Hits,
    #[serde(rename = "deaths")]
    #[strum(serialize = "deaths")]
    Deaths,
    #[serde(rename = "accuracy")]
    #[strum(serialize = "accuracy")]
    Accuracy,
    #[serde(rename = "shots")]
    #[strum(serialize = "shots")]
    Shots,
    #[serde(rename = "miss")]
    #[strum(serialize = "miss")]
    Miss,
    #[serde(rename = "hitsOwn")]
    #[strum(serialize = "hitsOwn")]
    HitsOwn,
    #[serde(rename = "deathsOwn")]
    #[strum(serialize = "deathsOwn")]
    DeathsOwn,
    #[serde(rename = "mines")]
    #[strum(serialize = "mines")]
    Mines,
    #[serde(rename = "kd-2")]
    #[strum(serialize = "kd-2")]
    KdTwo,
    #[serde(rename = "kd-1")]
    #[strum(serialize = "kd-1")]
    KdOne,
    #[serde(rename = "team-50")]
    #[strum(serialize = "team-50")]
    TeamFifty,
    #[serde(rename = "50-percent")]
    #[strum(serialize = "50-percent")]
    FiftyPercent,
    #[serde(rename = "5-percent")]
    #[strum(serialize = "5-percent")]
    FivePercent,
    #[serde(rename = "favouriteTarget")]
    #[strum(serialize = "favouriteTarget")]
    FavouriteTarget,
    #[serde(rename = "favouriteTargetOf")]
    #[strum(serialize = "favouriteTargetOf")]
    FavouriteTargetOf,
    #[serde(rename = "average")]
    #[strum(serialize = "average")]
    Average
}

/// Checked first, in this order.
pub const SPECIAL_TROPHIES: [Trophy; 6] = [
    Trophy::HundredPercent,
    Trophy::ZeroDeaths,
    Trophy::Devil,
    Trophy::NotFound,
    Trophy::NotFoundShots,
    Trophy::Fitness
];

/// Best-of-game awards, one holder each.
pub const CLASSIC_TROPHIES: [Trophy; 9] = [
    Trophy::Best,
    Trophy::Hits,
    Trophy::Deaths,
    Trophy::Accuracy,
    Trophy::Shots,
    Trophy::Miss,
    Trophy::HitsOwn,
    Trophy::DeathsOwn,
    Trophy::Mines
];

pub const OTHER_TROPHIES: [Trophy; 7] = [
    Trophy::KdTwo,
    Trophy::KdOne,
    Trophy::TeamFifty,
    Trophy::FiftyPercent,
    Trophy::FivePercent,
    Trophy::FavouriteTarget,
    Trophy::FavouriteTargetOf
];

impl Trophy {
    pub fn key(&self) -> String {
        self.to_string()
    }

    pub fn is_classic(&self) -> bool {
        CLASSIC_TROPHIES.contains(self)
    }

    /// Every trophy in precedence order, `Average` last.
    pub fn precedence() -> impl Iterator<Item = Trophy> {
        SPECIAL_TROPHIES
            .into_iter()
            .chain(CLASSIC_TROPHIES)
            .chain(OTHER_TROPHIES)
    }
}

pub struct TrophyEvaluator<'a> {
    game: &'a Game,
    settings: &'a ModeSettings
}

impl<'a> TrophyEvaluator<'a> {
    pub fn new(game: &'a Game, settings: &'a ModeSettings) -> TrophyEvaluator<'a> {
        TrophyEvaluator { game, settings }
    }

    /// The player's primary trophy: the first satisfied one in precedence
    /// order, `Average` when none is.
    pub fn get_one(&self, player: &Player) -> Trophy {
        Trophy::precedence()
            .find(|t| self.check(*t, player))
            .unwrap_or(Trophy::Average)
    }

    /// Every trophy the player satisfies, in precedence order.
    pub fn get_all(&self, player: &Player) -> Vec<Trophy> {
        let trophies: Vec<Trophy> = Trophy::precedence().filter(|t| self.check(*t, player)).collect();
        if trophies.is_empty() {
            return vec![Trophy::Average];
        }

        trophies
    }

    pub fn check(&self, trophy: Trophy, player: &Player) -> bool {
        let game = self.game;
        match trophy {
            Trophy::HundredPercent => player.accuracy > TROPHY_SNIPER_ACCURACY,
            Trophy::ZeroDeaths => player.deaths < TROPHY_UNTOUCHABLE_DEATHS && player.hits > 0,
            Trophy::Devil => player.score == 666 || player.shots == 666,
            Trophy::NotFound => player.score == 404,
            Trophy::NotFoundShots => player.shots == 404,
            Trophy::Fitness => {
                player.shots >= TROPHY_FITNESS_SHOTS && game.game_length_minutes() <= TROPHY_FITNESS_MAX_LENGTH
            }
            Trophy::KdTwo => kd(game.game_type, player) >= 2.0,
            Trophy::KdOne => {
                let kd = kd(game.game_type, player);
                player.hits > 0 && (0.95..=1.05).contains(&kd)
            }
            Trophy::TeamFifty => self.carried_team(player),
            Trophy::FiftyPercent => player.accuracy >= TROPHY_HALF_ACCURACY,
            Trophy::FivePercent => player.accuracy > 0.0 && player.accuracy < TROPHY_LOW_ACCURACY,
            Trophy::FavouriteTarget => favourite_target(game, player.vest)
                .is_some_and(|target| dominant_share(game.hits_between(player.vest, target), player.hits)),
            Trophy::FavouriteTargetOf => favourite_target_of(game, player.vest)
                .is_some_and(|shooter| dominant_share(game.hits_between(shooter, player.vest), player.deaths)),
            Trophy::Average => true,
            classic => self.best_player(classic) == Some(player.vest)
        }
    }

    /// Holder of a best-of-game trophy. Disabled trophies and values that
    /// are not positive have no holder; the first player wins ties.
    pub fn best_player(&self, trophy: Trophy) -> Option<VestId> {
        if !self.is_enabled(trophy) {
            return None;
        }

        if trophy == Trophy::Shots {
            return self.fewest_shots();
        }

        let mut best: Option<(VestId, f64)> = None;
        for player in &self.game.players {
            let value = classic_value(trophy, player)?;
            if value > 0.0 && best.map_or(true, |(_, current)| value > current) {
                best = Some((player.vest, value));
            }
        }

        best.map(|(vest, _)| vest)
    }

    fn is_enabled(&self, trophy: Trophy) -> bool {
        let s = self.settings;
        let team = self.game.game_type.is_team();
        match trophy {
            Trophy::Best => s.best_score,
            Trophy::Hits => s.best_hits,
            Trophy::Deaths => s.best_deaths,
            Trophy::Accuracy => s.best_accuracy,
            Trophy::Shots => s.best_shots,
            Trophy::Miss => s.best_miss,
            Trophy::HitsOwn => s.best_hits_own && team,
            Trophy::DeathsOwn => s.best_deaths_own && team,
            Trophy::Mines => s.best_mines && self.game.system.is_lasermaxx(),
            _ => false
        }
    }

    fn fewest_shots(&self) -> Option<VestId> {
        let mut best: Option<(VestId, u32)> = None;
        for player in self.game.players.iter().filter(|p| p.shots > 0) {
            if best.map_or(true, |(_, current)| player.shots < current) {
                best = Some((player.vest, player.shots));
            }
        }

        best.map(|(vest, _)| vest)
    }

    fn carried_team(&self, player: &Player) -> bool {
        let game = self.game;
        let Some(color) = player.team.filter(|_| game.game_type.is_team()) else {
            return false;
        };

        if game.team_players(color).count() < TROPHY_TEAM_MIN_PLAYERS {
            return false;
        }

        let team_score = game.team_score_sum(color);
        team_score > 0 && player.score as f64 >= TROPHY_TEAM_SHARE * team_score as f64
    }
}

fn classic_value(trophy: Trophy, player: &Player) -> Option<f64> {
    let value = match trophy {
        Trophy::Best => player.score as f64,
        Trophy::Hits => player.hits as f64,
        Trophy::Deaths => player.deaths as f64,
        Trophy::Accuracy => player.accuracy,
        Trophy::Miss => player.misses() as f64,
        Trophy::HitsOwn => player.hits_own as f64,
        Trophy::DeathsOwn => player.deaths_own as f64,
        Trophy::Mines => player.counters.mines_hits() as f64,
        _ => return None
    };

    Some(value)
}

fn dominant_share(count: u32, total: u32) -> bool {
    count >= TROPHY_FAVOURITE_MIN_COUNT && total > 0 && count as f64 >= TROPHY_FAVOURITE_SHARE * total as f64
}
