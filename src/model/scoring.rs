use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::model::{
    constants::SM5_NUKE_POINTS,
    game::{Game, Player, VendorCounters},
    structures::system::System
};

/// Point values per raw counter. One struct serves every vendor: fields a
/// vendor does not report simply never get multiplied by a non-zero count.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ScoringRules {
    pub hit_other: i64,
    pub hit_own: i64,
    pub death_other: i64,
    pub death_own: i64,
    pub shot: i64,
    #[serde(default)]
    pub bonus: BonusPoints
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct BonusPoints {
    pub agent: i64,
    pub invisibility: i64,
    pub machine_gun: i64,
    pub shield: i64,
    pub mine_hit: i64,
    pub penalty: i64,
    pub missile: i64,
    pub nuke: i64
}

/// How `scoring_death_own` is written to and read from storage rows.
///
/// Rows written by older releases stored the own-hit value in the own-death
/// column. `Legacy` reproduces that so those rows read back as they were
/// scored.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ScoringFieldMapping {
    #[default]
    Corrected,
    Legacy
}

/// Which parts of the scoring rules a recalculation applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoringScope {
    /// hits, deaths and shots against the "other" point values only
    Basic,
    /// own/other split plus vendor bonus points
    Full
}

impl ScoringRules {
    pub fn for_system(system: System) -> ScoringRules {
        match system {
            System::Evo5 => ScoringRules {
                hit_other: 100,
                hit_own: -25,
                death_other: -30,
                death_own: -25,
                shot: 0,
                bonus: BonusPoints {
                    mine_hit: -100,
                    ..BonusPoints::default()
                }
            },
            System::Evo6 => ScoringRules {
                hit_other: 100,
                hit_own: -25,
                death_other: -30,
                death_own: -25,
                shot: 0,
                bonus: BonusPoints {
                    mine_hit: -100,
                    penalty: -500,
                    ..BonusPoints::default()
                }
            },
            System::LaserForce => ScoringRules {
                hit_other: 100,
                hit_own: -100,
                death_other: -20,
                death_own: -20,
                shot: 0,
                bonus: BonusPoints {
                    missile: 500,
                    nuke: SM5_NUKE_POINTS,
                    ..BonusPoints::default()
                }
            }
        }
    }

    pub fn to_storage_fields(&self, mapping: ScoringFieldMapping) -> IndexMap<&'static str, i64> {
        let death_own = match mapping {
            ScoringFieldMapping::Corrected => self.death_own,
            ScoringFieldMapping::Legacy => self.hit_own
        };

        IndexMap::from([
            ("scoring_hit_other", self.hit_other),
            ("scoring_hit_own", self.hit_own),
            ("scoring_death_other", self.death_other),
            ("scoring_death_own", death_own),
            ("scoring_shot", self.shot),
            ("scoring_agent", self.bonus.agent),
            ("scoring_invisibility", self.bonus.invisibility),
            ("scoring_machine_gun", self.bonus.machine_gun),
            ("scoring_shield", self.bonus.shield),
            ("scoring_mine_hit", self.bonus.mine_hit),
            ("scoring_penalty", self.bonus.penalty),
            ("scoring_missile", self.bonus.missile),
            ("scoring_nuke", self.bonus.nuke)
        ])
    }

    /// Reads rules back from a storage row. Missing columns read as 0.
    pub fn from_storage_fields(fields: &IndexMap<&'static str, i64>) -> ScoringRules {
        let get = |key: &str| fields.get(key).copied().unwrap_or(0);

        ScoringRules {
            hit_other: get("scoring_hit_other"),
            hit_own: get("scoring_hit_own"),
            death_other: get("scoring_death_other"),
            death_own: get("scoring_death_own"),
            shot: get("scoring_shot"),
            bonus: BonusPoints {
                agent: get("scoring_agent"),
                invisibility: get("scoring_invisibility"),
                machine_gun: get("scoring_machine_gun"),
                shield: get("scoring_shield"),
                mine_hit: get("scoring_mine_hit"),
                penalty: get("scoring_penalty"),
                missile: get("scoring_missile"),
                nuke: get("scoring_nuke")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreBreakdown {
    pub hits: i64,
    pub deaths: i64,
    pub shots: i64,
    pub bonus: i64
}

impl ScoreBreakdown {
    pub fn total(&self) -> i64 {
        self.hits + self.deaths + self.shots + self.bonus
    }
}

pub struct ScoringEngine<'a> {
    rules: &'a ScoringRules
}

impl<'a> ScoringEngine<'a> {
    pub fn new(rules: &'a ScoringRules) -> ScoringEngine<'a> {
        ScoringEngine { rules }
    }

    pub fn breakdown(&self, player: &Player, scope: ScoringScope) -> ScoreBreakdown {
        let r = self.rules;
        match scope {
            ScoringScope::Basic => ScoreBreakdown {
                hits: player.hits as i64 * r.hit_other,
                deaths: player.deaths as i64 * r.death_other,
                shots: player.shots as i64 * r.shot,
                bonus: 0
            },
            ScoringScope::Full => ScoreBreakdown {
                hits: player.hits_other as i64 * r.hit_other + player.hits_own as i64 * r.hit_own,
                deaths: player.deaths_other as i64 * r.death_other + player.deaths_own as i64 * r.death_own,
                shots: player.shots as i64 * r.shot,
                bonus: self.bonus_points(player)
            }
        }
    }

    pub fn score(&self, player: &Player, scope: ScoringScope) -> i64 {
        self.breakdown(player, scope).total()
    }

    fn bonus_points(&self, player: &Player) -> i64 {
        let b = &self.rules.bonus;
        match &player.counters {
            VendorCounters::Evo5(c) => {
                c.agent as i64 * b.agent
                    + c.invisibility as i64 * b.invisibility
                    + c.machine_gun as i64 * b.machine_gun
                    + c.shield as i64 * b.shield
                    + c.mines_hits as i64 * b.mine_hit
            }
            VendorCounters::Evo6(c) => {
                let p = &c.power_ups;
                p.agent as i64 * b.agent
                    + p.invisibility as i64 * b.invisibility
                    + p.machine_gun as i64 * b.machine_gun
                    + p.shield as i64 * b.shield
                    + p.mines_hits as i64 * b.mine_hit
                    + c.penalty_count as i64 * b.penalty
            }
            VendorCounters::LaserForce(c) => c.missiles as i64 * b.missile + c.nukes as i64 * b.nuke
        }
    }

    /// Rewrites every player's score from the game's rules and re-sums the
    /// teams. Only reads raw counters, so repeated calls give the same result.
    pub fn recalculate(game: &mut Game, scope: ScoringScope) {
        let engine = ScoringEngine::new(&game.scoring);
        for player in game.players.iter_mut() {
            player.score = engine.score(player, scope);
        }

        game.recompute_team_scores();
    }
}
