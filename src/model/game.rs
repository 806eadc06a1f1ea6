use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{
    constants::REFERENCE_GAME_LENGTH,
    scoring::ScoringRules,
    structures::{game_type::GameType, system::System, team_color::TeamColor}
};

pub type VestId = u32;

/// Vendor specific counters. Evo5 and Evo6 share the LaserMaxx power-up set.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum VendorCounters {
    Evo5(LaserMaxxCounters),
    Evo6(Evo6Counters),
    LaserForce(LaserForceCounters)
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct LaserMaxxCounters {
    pub agent: u32,
    pub invisibility: u32,
    pub machine_gun: u32,
    pub shield: u32,
    pub mines_hits: u32
}

impl LaserMaxxCounters {
    pub fn power_ups(&self) -> u32 {
        self.agent + self.invisibility + self.machine_gun + self.shield
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Evo6Counters {
    #[serde(flatten)]
    pub power_ups: LaserMaxxCounters,
    pub penalty_count: u32,
    pub activity: u32
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct LaserForceCounters {
    pub missiles: u32,
    pub nukes: u32
}

impl VendorCounters {
    /// Empty counters in the shape the given system reports.
    pub fn empty(system: System) -> Self {
        match system {
            System::Evo5 => VendorCounters::Evo5(LaserMaxxCounters::default()),
            System::Evo6 => VendorCounters::Evo6(Evo6Counters::default()),
            System::LaserForce => VendorCounters::LaserForce(LaserForceCounters::default())
        }
    }

    pub fn lasermaxx(&self) -> Option<&LaserMaxxCounters> {
        match self {
            VendorCounters::Evo5(c) => Some(c),
            VendorCounters::Evo6(c) => Some(&c.power_ups),
            VendorCounters::LaserForce(_) => None
        }
    }

    pub fn mines_hits(&self) -> u32 {
        self.lasermaxx().map(|c| c.mines_hits).unwrap_or(0)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub vest: VestId,
    pub name: String,
    pub team: Option<TeamColor>,
    pub shots: u32,
    pub hits: u32,
    pub deaths: u32,
    #[serde(default)]
    pub hits_own: u32,
    #[serde(default)]
    pub hits_other: u32,
    #[serde(default)]
    pub deaths_own: u32,
    #[serde(default)]
    pub deaths_other: u32,
    #[serde(default)]
    pub ammo_rest: Option<u32>,
    #[serde(default)]
    pub lives_rest: Option<u32>,
    #[serde(default)]
    pub goals: u32,
    #[serde(default)]
    pub bases_destroyed: u32,
    pub counters: VendorCounters,
    #[serde(default)]
    pub accuracy: f64,
    #[serde(default)]
    pub position: u32,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub skill: i64
}

impl Player {
    pub fn new(system: System, vest: VestId, name: &str, team: Option<TeamColor>) -> Player {
        Player {
            vest,
            name: name.to_string(),
            team,
            shots: 0,
            hits: 0,
            deaths: 0,
            hits_own: 0,
            hits_other: 0,
            deaths_own: 0,
            deaths_other: 0,
            ammo_rest: None,
            lives_rest: None,
            goals: 0,
            bases_destroyed: 0,
            counters: VendorCounters::empty(system),
            accuracy: 0.0,
            position: 0,
            score: 0,
            skill: 0
        }
    }

    pub fn misses(&self) -> u32 {
        self.shots.saturating_sub(self.hits)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub color: TeamColor,
    pub name: String,
    /// Cached sum of the members' scores. Recomputed by
    /// [`Game::recompute_team_scores`], never authoritative.
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub position: u32
}

impl Team {
    pub fn new(color: TeamColor) -> Team {
        Team {
            color,
            name: color.default_name().to_string(),
            score: 0,
            position: 0
        }
    }
}

/// Directed record of how many times `shooter` hit `target`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitRecord {
    pub shooter: VestId,
    pub target: VestId,
    pub count: u32
}

/// Reference to the game mode a game was played in.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ModeRef {
    /// Free-text mode name as reported by the vendor data.
    pub name: String,
    /// Id of the stored mode row, if any.
    pub id: Option<i64>,
    /// Identifier of the resolved variant, filled in by the pipeline.
    pub variant: Option<String>
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Timing {
    /// Seconds before the game starts
    pub before: u32,
    /// Planned game length in minutes
    pub game_length: u32,
    /// Seconds after the game ends
    pub after: u32
}

impl Default for Timing {
    fn default() -> Self {
        Timing {
            before: 20,
            game_length: REFERENCE_GAME_LENGTH as u32,
            after: 30
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Winner {
    Team(TeamColor),
    Player(VestId)
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    pub code: String,
    pub system: System,
    #[serde(default)]
    pub arena: Option<i64>,
    pub game_type: GameType,
    pub mode: ModeRef,
    pub scoring: ScoringRules,
    #[serde(default)]
    pub timing: Timing,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub imported: Option<DateTime<Utc>>,
    #[serde(default)]
    pub start_lives: Option<u32>,
    #[serde(default)]
    pub start_ammo: Option<u32>,
    #[serde(default)]
    pub teams: Vec<Team>,
    pub players: Vec<Player>,
    #[serde(default)]
    pub hits: Vec<HitRecord>
}

impl Game {
    pub fn new(code: &str, system: System, game_type: GameType, mode_name: &str) -> Game {
        Game {
            code: code.to_string(),
            system,
            arena: None,
            game_type,
            mode: ModeRef {
                name: mode_name.to_string(),
                ..ModeRef::default()
            },
            scoring: ScoringRules::for_system(system),
            timing: Timing::default(),
            start: None,
            end: None,
            imported: None,
            start_lives: None,
            start_ammo: None,
            teams: Vec::new(),
            players: Vec::new(),
            hits: Vec::new()
        }
    }

    pub fn is_finished(&self) -> bool {
        self.end.is_some() && self.imported.is_some()
    }

    /// Real game length in minutes. Falls back to the planned length when the
    /// timestamps are missing or inconsistent.
    pub fn game_length_minutes(&self) -> f64 {
        if let (Some(start), Some(end)) = (self.start, self.end) {
            let seconds = (end - start).num_seconds();
            if seconds > 0 {
                return seconds as f64 / 60.0;
            }
        }

        if self.timing.game_length > 0 {
            return self.timing.game_length as f64;
        }

        REFERENCE_GAME_LENGTH
    }

    pub fn player(&self, vest: VestId) -> Option<&Player> {
        self.players.iter().find(|p| p.vest == vest)
    }

    pub fn player_mut(&mut self, vest: VestId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.vest == vest)
    }

    pub fn team(&self, color: TeamColor) -> Option<&Team> {
        self.teams.iter().find(|t| t.color == color)
    }

    pub fn team_players(&self, color: TeamColor) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(move |p| p.team == Some(color))
    }

    /// Number of teams that have at least one player.
    pub fn team_count(&self) -> u8 {
        self.teams
            .iter()
            .filter(|t| self.team_players(t.color).next().is_some())
            .count() as u8
    }

    pub fn team_score_sum(&self, color: TeamColor) -> i64 {
        self.team_players(color).map(|p| p.score).sum()
    }

    pub fn team_hits(&self, color: TeamColor) -> u32 {
        self.team_players(color).map(|p| p.hits).sum()
    }

    pub fn team_lives(&self, color: TeamColor) -> u32 {
        self.team_players(color).map(|p| p.lives_rest.unwrap_or(0)).sum()
    }

    pub fn team_goals(&self, color: TeamColor) -> u32 {
        self.team_players(color).map(|p| p.goals).sum()
    }

    pub fn team_bases_destroyed(&self, color: TeamColor) -> u32 {
        self.team_players(color).map(|p| p.bases_destroyed).sum()
    }

    pub fn recompute_team_scores(&mut self) {
        let sums: HashMap<TeamColor, i64> = self
            .teams
            .iter()
            .map(|t| (t.color, self.team_score_sum(t.color)))
            .collect();

        for team in self.teams.iter_mut() {
            team.score = sums.get(&team.color).copied().unwrap_or(0);
        }
    }

    pub fn is_teammate(&self, a: &Player, b: &Player) -> bool {
        self.game_type.is_team() && a.team.is_some() && a.team == b.team
    }

    pub fn teammate_count(&self, player: &Player) -> u32 {
        if !self.game_type.is_team() {
            return 0;
        }

        self.players
            .iter()
            .filter(|p| p.vest != player.vest && self.is_teammate(player, p))
            .count() as u32
    }

    pub fn enemy_count(&self, player: &Player) -> u32 {
        self.players
            .iter()
            .filter(|p| p.vest != player.vest && !self.is_teammate(player, p))
            .count() as u32
    }

    pub fn hits_between(&self, shooter: VestId, target: VestId) -> u32 {
        self.hits
            .iter()
            .find(|h| h.shooter == shooter && h.target == target)
            .map(|h| h.count)
            .unwrap_or(0)
    }

    /// Adds to the (shooter, target) record, creating it if needed. Keeps the
    /// records unique per pair.
    pub fn add_hits(&mut self, shooter: VestId, target: VestId, count: u32) {
        match self.hits.iter_mut().find(|h| h.shooter == shooter && h.target == target) {
            Some(record) => record.count += count,
            None => self.hits.push(HitRecord { shooter, target, count })
        }
    }

    /// Brings the own/other split and the totals into agreement.
    ///
    /// Solo games copy totals into the "other" fields and zero the own-team
    /// fields. Team games rebuild the split from the hit records when there
    /// are any, and derive totals from the split otherwise.
    pub fn normalize_counters(&mut self) {
        if !self.game_type.is_team() {
            for player in self.players.iter_mut() {
                player.hits_other = player.hits;
                player.deaths_other = player.deaths;
                player.hits_own = 0;
                player.deaths_own = 0;
            }
            return;
        }

        if !self.hits.is_empty() {
            let teams: HashMap<VestId, Option<TeamColor>> = self.players.iter().map(|p| (p.vest, p.team)).collect();
            let mut split: HashMap<VestId, (u32, u32, u32, u32)> = HashMap::new();

            for record in &self.hits {
                let (Some(shooter_team), Some(target_team)) = (teams.get(&record.shooter), teams.get(&record.target))
                else {
                    continue;
                };
                let own = shooter_team.is_some() && shooter_team == target_team;

                let shooter = split.entry(record.shooter).or_default();
                if own {
                    shooter.0 += record.count;
                } else {
                    shooter.1 += record.count;
                }

                let target = split.entry(record.target).or_default();
                if own {
                    target.2 += record.count;
                } else {
                    target.3 += record.count;
                }
            }

            for player in self.players.iter_mut() {
                let (hits_own, hits_other, deaths_own, deaths_other) =
                    split.get(&player.vest).copied().unwrap_or_default();
                player.hits_own = hits_own;
                player.hits_other = hits_other;
                player.deaths_own = deaths_own;
                player.deaths_other = deaths_other;
            }
        }

        for player in self.players.iter_mut() {
            player.hits = player.hits_own + player.hits_other;
            player.deaths = player.deaths_own + player.deaths_other;
        }
    }
}
