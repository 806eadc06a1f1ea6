use std::{
    collections::HashMap,
    fmt::{self, Display},
    sync::{Arc, RwLock}
};

use itertools::iproduct;
use rayon::prelude::*;
use strum::IntoEnumIterator;
use tracing::{debug, info, warn};

use crate::{
    error::RegressionError,
    model::{
        constants::{MAX_TEAM_COUNT, MIN_TEAM_COUNT},
        modes::GameModeRow,
        regression::{BaselineQuery, CoefficientModel, ModeFilter, RegressionStatEngine},
        structures::{game_type::GameType, statistic::Statistic}
    },
    utils::progress_utils::progress_bar
};

/// Typed identity of one stored baseline. Its `Display` form is the
/// persistence key, e.g. `3hitsModelTEAM7-4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BaselineKey {
    pub arena: Option<i64>,
    pub statistic: Statistic,
    pub game_type: GameType,
    /// Set for non-rankable modes only
    pub mode: Option<i64>,
    /// Set for team games with more than two teams only
    pub team_count: Option<u8>
}

impl From<&BaselineQuery> for BaselineKey {
    fn from(query: &BaselineQuery) -> Self {
        BaselineKey {
            arena: query.arena,
            statistic: query.statistic,
            game_type: query.game_type,
            mode: query.mode.mode_id(),
            team_count: query.team_count.filter(|count| *count > MIN_TEAM_COUNT)
        }
    }
}

impl Display for BaselineKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(arena) = self.arena {
            write!(f, "{}", arena)?;
        }
        write!(f, "{}Model{}", self.statistic, self.game_type)?;
        if let Some(mode) = self.mode {
            write!(f, "{}", mode)?;
        }
        if let Some(count) = self.team_count {
            write!(f, "-{}", count)?;
        }

        Ok(())
    }
}

/// Key/value storage for fitted baselines.
pub trait BaselinePersistence: Send + Sync {
    fn get(&self, key: &str) -> Option<CoefficientModel>;

    /// Returns `false` when the value could not be stored.
    fn set(&self, key: &str, model: &CoefficientModel) -> bool;
}

#[derive(Default)]
pub struct MemoryBaselineCache {
    values: RwLock<HashMap<String, CoefficientModel>>
}

impl MemoryBaselineCache {
    pub fn new() -> MemoryBaselineCache {
        MemoryBaselineCache::default()
    }

    pub fn len(&self) -> usize {
        self.values.read().map(|v| v.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .values
            .read()
            .map(|v| v.keys().cloned().collect())
            .unwrap_or_default();
        keys.sort();

        keys
    }
}

impl BaselinePersistence for MemoryBaselineCache {
    fn get(&self, key: &str) -> Option<CoefficientModel> {
        self.values.read().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, model: &CoefficientModel) -> bool {
        match self.values.write() {
            Ok(mut values) => {
                values.insert(key.to_string(), model.clone());
                true
            }
            Err(_) => false
        }
    }
}

/// Outcome counts of a full recomputation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecomputeReport {
    pub computed: usize,
    pub insufficient: usize,
    pub failed: usize,
    /// Computed, but the persistence layer refused the write
    pub unsaved: usize
}

impl RecomputeReport {
    pub fn total(&self) -> usize {
        self.computed + self.insufficient + self.failed
    }
}

enum Outcome {
    Computed { saved: bool },
    Insufficient,
    Failed
}

pub struct StatBaselineStore {
    engine: RegressionStatEngine,
    persistence: Arc<dyn BaselinePersistence>,
    memo: RwLock<HashMap<BaselineKey, CoefficientModel>>,
    /// Combinations the history could not fit, as (rows, required)
    insufficient: RwLock<HashMap<BaselineKey, (usize, usize)>>
}

impl StatBaselineStore {
    pub fn new(engine: RegressionStatEngine, persistence: Arc<dyn BaselinePersistence>) -> StatBaselineStore {
        StatBaselineStore {
            engine,
            persistence,
            memo: RwLock::new(HashMap::new()),
            insufficient: RwLock::new(HashMap::new())
        }
    }

    /// Returns the baseline for the combination: memoized, persisted, or
    /// freshly fitted (and then persisted) in that order. A combination
    /// without enough history keeps failing until `recompute_all` runs.
    pub fn get(
        &self,
        statistic: Statistic,
        game_type: GameType,
        mode: Option<&GameModeRow>,
        team_count: u8,
        arena: Option<i64>
    ) -> Result<CoefficientModel, RegressionError> {
        let query = BaselineQuery::new(statistic, game_type, mode, team_count, arena);
        let key = BaselineKey::from(&query);

        if let Some(model) = self.memo.read().ok().and_then(|memo| memo.get(&key).cloned()) {
            return Ok(model);
        }

        if let Some((rows, required)) = self.insufficient.read().ok().and_then(|known| known.get(&key).copied()) {
            return Err(RegressionError::InsufficientData { rows, required });
        }

        let model = match self.persistence.get(&key.to_string()) {
            Some(model) => model,
            None => {
                let model = self.engine.compute_for_query(&query).inspect_err(|e| self.remember_failure(key, e))?;
                if !self.persistence.set(&key.to_string(), &model) {
                    warn!("Failed to persist baseline {}, keeping it in memory only", key);
                }
                model
            }
        };

        self.remember(key, &model);

        Ok(model)
    }

    /// Refits every (arena, statistic, game type, team count, mode) baseline.
    /// Failures are counted, never propagated.
    pub fn recompute_all(&self, arenas: &[Option<i64>], modes: &[GameModeRow]) -> RecomputeReport {
        let queries = recompute_queries(arenas, modes);
        if let Ok(mut known) = self.insufficient.write() {
            known.clear();
        }
        info!("Recomputing {} baselines", queries.len());

        let bar = progress_bar(queries.len() as u64, "Recomputing baselines".to_string());
        let outcomes: Vec<Outcome> = queries
            .par_iter()
            .map(|query| {
                let outcome = self.recompute(query);
                if let Some(bar) = &bar {
                    bar.inc(1);
                }
                outcome
            })
            .collect();

        if let Some(bar) = &bar {
            bar.finish();
        }

        let report = outcomes.iter().fold(RecomputeReport::default(), |mut report, outcome| {
            match outcome {
                Outcome::Computed { saved } => {
                    report.computed += 1;
                    if !saved {
                        report.unsaved += 1;
                    }
                }
                Outcome::Insufficient => report.insufficient += 1,
                Outcome::Failed => report.failed += 1
            }
            report
        });

        info!(
            "Baselines recomputed: {} computed, {} insufficient, {} failed, {} unsaved",
            report.computed, report.insufficient, report.failed, report.unsaved
        );

        report
    }

    fn recompute(&self, query: &BaselineQuery) -> Outcome {
        let key = BaselineKey::from(query);
        match self.engine.compute_for_query(query) {
            Ok(model) => {
                let saved = self.persistence.set(&key.to_string(), &model);
                self.remember(key, &model);
                Outcome::Computed { saved }
            }
            Err(e @ RegressionError::InsufficientData { .. }) => {
                debug!("Skipping baseline {}: {}", key, e);
                self.remember_failure(key, &e);
                Outcome::Insufficient
            }
            Err(e) => {
                warn!("Failed to recompute baseline {}: {}", key, e);
                Outcome::Failed
            }
        }
    }

    fn remember(&self, key: BaselineKey, model: &CoefficientModel) {
        if let Ok(mut memo) = self.memo.write() {
            memo.insert(key, model.clone());
        }
    }

    fn remember_failure(&self, key: BaselineKey, error: &RegressionError) {
        if let RegressionError::InsufficientData { rows, required } = error {
            if let Ok(mut known) = self.insufficient.write() {
                known.insert(key, (*rows, *required));
            }
        }
    }
}

/// Every combination a full recomputation covers. Each non-rankable mode
/// gets its own baseline next to the pooled one, for its own game type.
pub fn recompute_queries(arenas: &[Option<i64>], modes: &[GameModeRow]) -> Vec<BaselineQuery> {
    let shapes: Vec<(GameType, u8)> = std::iter::once((GameType::Solo, 0))
        .chain((MIN_TEAM_COUNT..=MAX_TEAM_COUNT).map(|count| (GameType::Team, count)))
        .collect();

    iproduct!(arenas.iter().copied(), Statistic::iter(), shapes.into_iter())
        .flat_map(|(arena, statistic, (game_type, team_count))| {
            let isolated = modes
                .iter()
                .filter(move |m| !m.rankable && m.game_type == game_type)
                .map(|m| ModeFilter::Only(m.id));

            std::iter::once(ModeFilter::Rankable)
                .chain(isolated)
                .map(move |mode| BaselineQuery {
                    statistic,
                    game_type,
                    team_count: game_type.is_team().then_some(team_count),
                    arena,
                    mode
                })
        })
        .collect()
}
