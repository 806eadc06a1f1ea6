use std::{cmp::Ordering, collections::HashMap, fmt::Debug};

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

use crate::model::{
    events::GameEvent,
    game::{Game, VestId, Winner},
    scoring::{ScoringEngine, ScoringScope},
    structures::{game_type::GameType, mode_settings::ModeSettings, system::System, team_color::TeamColor}
};

pub mod builtin;
pub mod laserforce;
pub mod lasermaxx;
pub mod registry;

/// A stored game mode definition.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GameModeRow {
    pub id: i64,
    pub name: String,
    /// Comma separated systems the mode applies to, `None` for all.
    #[serde(default)]
    pub systems: Option<String>,
    pub game_type: GameType,
    #[serde(default = "default_rankable")]
    pub rankable: bool,
    #[serde(default)]
    pub settings: ModeSettings
}

fn default_rankable() -> bool {
    true
}

impl GameModeRow {
    pub fn applies_to(&self, system: System) -> bool {
        match &self.systems {
            None => true,
            Some(list) => System::parse_list(list).contains(&system)
        }
    }
}

/// Identity and settings shared by every variant.
#[derive(Debug, Clone, PartialEq)]
pub struct ModeInfo {
    pub id: String,
    pub name: String,
    pub game_type: GameType,
    pub system: Option<System>,
    pub settings: ModeSettings,
    pub row: Option<GameModeRow>
}

impl ModeInfo {
    pub fn new(
        system: Option<System>,
        name: &str,
        game_type: GameType,
        row: Option<&GameModeRow>,
        default_settings: ModeSettings
    ) -> ModeInfo {
        let namespace = system.map(|s| s.to_string()).unwrap_or_else(|| "generic".to_string());
        let id = match row {
            Some(r) => format!("{}:{}#{}", namespace, name, r.id),
            None => format!("{}:{}", namespace, name)
        };

        ModeInfo {
            id,
            name: name.to_string(),
            game_type,
            system,
            settings: row.map(|r| r.settings.clone()).unwrap_or(default_settings),
            row: row.cloned()
        }
    }
}

/// Behavior of one game mode. Only `info` is required; everything else has
/// the plain "highest score wins" default.
pub trait GameModeVariant: Send + Sync + Debug {
    fn info(&self) -> &ModeInfo;

    fn id(&self) -> &str {
        &self.info().id
    }

    fn name(&self) -> &str {
        &self.info().name
    }

    fn is_team(&self) -> bool {
        self.info().game_type.is_team()
    }

    fn is_solo(&self) -> bool {
        !self.is_team()
    }

    fn settings(&self) -> &ModeSettings {
        &self.info().settings
    }

    fn row(&self) -> Option<&GameModeRow> {
        self.info().row.as_ref()
    }

    /// Rankable modes contribute to the pooled regression baseline.
    fn is_rankable(&self) -> bool {
        self.row().map(|r| r.rankable).unwrap_or(true)
    }

    /// `None` is a draw.
    fn get_win(&self, game: &Game) -> Option<Winner> {
        default_win(game, self.is_team())
    }

    fn recalculate_scores(&self, game: &mut Game) {
        ScoringEngine::recalculate(game, ScoringScope::Basic);
    }

    fn reorder_game(&self, game: &mut Game) {
        reorder_by_score(game);
    }

    fn as_modify_results(&self) -> Option<&dyn ModifyResultsMode> {
        None
    }

    fn as_custom_load(&self) -> Option<&dyn CustomLoadMode> {
        None
    }

    fn as_custom_events(&self) -> Option<&dyn CustomEventsMode> {
        None
    }
}

/// Post-scoring adjustments.
pub trait ModifyResultsMode {
    /// Remaining-ammo bookkeeping. Runs before scoring and never touches scores.
    fn settle_ammo(&self, game: &mut Game) {}

    /// Score adjustments after the regular recalculation.
    fn modify_results(&self, game: &mut Game);
}

/// Pre-game hook altering the initial team and player assignment.
pub trait CustomLoadMode {
    fn prepare_load(&self, load: &mut GameLoad);
}

/// Handles vendor events the generic event mapping does not know.
pub trait CustomEventsMode {
    /// Returns `true` when the event was consumed.
    fn process_event(&self, game: &mut Game, event: &GameEvent) -> bool;
}

/// Player to team assignment sent to the hardware before a game starts.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GameLoad {
    pub seed: u64,
    pub teams: Vec<TeamColor>,
    pub players: Vec<LoadPlayer>
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LoadPlayer {
    pub vest: VestId,
    pub name: String,
    pub team: Option<TeamColor>
}

/// Highest score wins; a tie at the top is a draw.
pub fn default_win(game: &Game, team: bool) -> Option<Winner> {
    if team {
        let mut scores: Vec<(TeamColor, i64)> = game
            .teams
            .iter()
            .filter(|t| game.team_players(t.color).next().is_some())
            .map(|t| (t.color, game.team_score_sum(t.color)))
            .collect();
        scores.sort_by(|a, b| b.1.cmp(&a.1));

        return match scores.as_slice() {
            [] => None,
            [(color, _)] => Some(Winner::Team(*color)),
            [(color, first), (_, second), ..] if first > second => Some(Winner::Team(*color)),
            _ => None
        };
    }

    let mut scores: Vec<(VestId, i64)> = game.players.iter().map(|p| (p.vest, p.score)).collect();
    scores.sort_by(|a, b| b.1.cmp(&a.1));

    match scores.as_slice() {
        [] => None,
        [(vest, _)] => Some(Winner::Player(*vest)),
        [(vest, first), (_, second), ..] if first > second => Some(Winner::Player(*vest)),
        _ => None
    }
}

/// Picks the single entity with the highest value, `None` on a tie at the top.
pub fn unique_max<K: Copy>(values: impl IntoIterator<Item = (K, i64)>) -> Option<K> {
    let mut best: Option<(K, i64)> = None;
    let mut tied = false;
    for (key, value) in values {
        match best {
            Some((_, current)) => match value.cmp(&current) {
                Ordering::Greater => {
                    best = Some((key, value));
                    tied = false;
                }
                Ordering::Equal => tied = true,
                Ordering::Less => {}
            },
            None => best = Some((key, value))
        }
    }

    if tied {
        return None;
    }

    best.map(|(key, _)| key)
}

/// Assigns 1-based positions by score, descending. Equal scores keep their
/// current order.
pub fn reorder_by_score(game: &mut Game) {
    let mut order: Vec<usize> = (0..game.players.len()).collect();
    order.sort_by(|a, b| game.players[*b].score.cmp(&game.players[*a].score));
    for (position, index) in order.into_iter().enumerate() {
        game.players[index].position = position as u32 + 1;
    }

    let sums: Vec<i64> = game.teams.iter().map(|t| game.team_score_sum(t.color)).collect();
    let mut order: Vec<usize> = (0..game.teams.len()).collect();
    order.sort_by(|a, b| sums[*b].cmp(&sums[*a]));
    for (position, index) in order.into_iter().enumerate() {
        game.teams[index].position = position as u32 + 1;
    }
}

lazy_static! {
    static ref TRANSLITERATIONS: HashMap<char, &'static str> = HashMap::from([
        ('á', "a"),
        ('č', "c"),
        ('ď', "d"),
        ('é', "e"),
        ('ě', "e"),
        ('í', "i"),
        ('ň', "n"),
        ('ó', "o"),
        ('ř', "r"),
        ('š', "s"),
        ('ť', "t"),
        ('ú', "u"),
        ('ů', "u"),
        ('ý', "y"),
        ('ž', "z"),
        ('ä', "a"),
        ('ö', "o"),
        ('ü', "u"),
        ('ß', "ss")
    ]);
}

/// Normalizes a free-text mode name into the name variants are registered
/// under: transliterated, Pascal-cased, with an `M` prefix when it would
/// otherwise start with a digit. `"Týmové základny"` becomes `TymoveZakladny`.
pub fn mode_class_name(name: &str) -> String {
    let ascii: String = name
        .to_lowercase()
        .chars()
        .map(|c| match TRANSLITERATIONS.get(&c) {
            Some(replacement) => replacement.to_string(),
            None => c.to_string()
        })
        .collect();

    let mut class_name: String = ascii
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new()
            }
        })
        .collect();

    if class_name.starts_with(|c: char| c.is_ascii_digit()) {
        class_name.insert(0, 'M');
    }

    class_name
}
