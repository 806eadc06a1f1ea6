use std::{collections::BTreeMap, sync::Arc};

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use tracing::debug;

use crate::{
    error::RegressionError,
    model::{
        constants::{MIN_REGRESSION_ROWS, R_SQUARED_TIE_EPSILON, SVD_EPSILON},
        modes::GameModeRow,
        structures::{feature_expansion::FeatureExpansion, game_type::GameType, statistic::Statistic}
    }
};

/// Fitted coefficients for one statistic, evaluated on the feature row of
/// its expansion.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CoefficientModel {
    pub expansion: FeatureExpansion,
    pub coefficients: Vec<f64>,
    #[serde(default)]
    pub r_squared: f64
}

impl CoefficientModel {
    pub fn linear(coefficients: Vec<f64>) -> CoefficientModel {
        CoefficientModel {
            expansion: FeatureExpansion::Linear,
            coefficients,
            r_squared: 0.0
        }
    }

    pub fn constant(value: f64) -> CoefficientModel {
        CoefficientModel::linear(vec![value, 0.0, 0.0, 0.0])
    }

    pub fn predict(&self, enemies: f64, teammates: f64, game_length: f64) -> f64 {
        self.expansion
            .expand(enemies, teammates, game_length)
            .iter()
            .zip(self.coefficients.iter())
            .map(|(x, c)| x * c)
            .sum()
    }
}

/// One aggregated history row: the median value of a statistic for games of
/// one (enemies, teammates) shape.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StatRow {
    pub enemies: u32,
    pub teammates: u32,
    pub game_length: f64,
    pub value: f64
}

/// One player's value of a statistic in one past game, before aggregation.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawStatRow {
    pub arena: Option<i64>,
    pub mode: Option<i64>,
    pub rankable: bool,
    pub game_type: GameType,
    pub team_count: u8,
    pub statistic: Statistic,
    pub enemies: u32,
    pub teammates: u32,
    pub game_length: f64,
    pub value: f64
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModeFilter {
    /// Pool every rankable mode together
    Rankable,
    /// Only games of this (non-rankable) mode
    Only(i64)
}

impl ModeFilter {
    pub fn for_mode(mode: Option<&GameModeRow>) -> ModeFilter {
        match mode {
            Some(row) if !row.rankable => ModeFilter::Only(row.id),
            _ => ModeFilter::Rankable
        }
    }

    pub fn mode_id(&self) -> Option<i64> {
        match self {
            ModeFilter::Rankable => None,
            ModeFilter::Only(id) => Some(*id)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BaselineQuery {
    pub statistic: Statistic,
    pub game_type: GameType,
    /// Only set for team games
    pub team_count: Option<u8>,
    pub arena: Option<i64>,
    pub mode: ModeFilter
}

impl BaselineQuery {
    pub fn new(
        statistic: Statistic,
        game_type: GameType,
        mode: Option<&GameModeRow>,
        team_count: u8,
        arena: Option<i64>
    ) -> BaselineQuery {
        BaselineQuery {
            statistic,
            game_type,
            team_count: game_type.is_team().then_some(team_count),
            arena,
            mode: ModeFilter::for_mode(mode)
        }
    }

    pub fn matches(&self, row: &RawStatRow) -> bool {
        if row.statistic != self.statistic || row.game_type != self.game_type {
            return false;
        }

        if self.team_count.is_some_and(|count| count != row.team_count) {
            return false;
        }

        if self.arena.is_some() && self.arena != row.arena {
            return false;
        }

        match self.mode {
            ModeFilter::Rankable => row.rankable,
            ModeFilter::Only(id) => row.mode == Some(id)
        }
    }
}

/// Read side of the historical game store.
pub trait HistoricalStatSource: Send + Sync {
    /// Rows already aggregated to one median per (enemies, teammates) bucket.
    fn rows(&self, query: &BaselineQuery) -> Result<Vec<StatRow>, RegressionError>;
}

/// Collapses raw per-player rows into one median row per game shape.
pub fn aggregate_medians<'a>(rows: impl IntoIterator<Item = &'a RawStatRow>) -> Vec<StatRow> {
    let mut buckets: BTreeMap<(u32, u32), (Vec<f64>, Vec<f64>)> = BTreeMap::new();
    for row in rows {
        let bucket = buckets.entry((row.enemies, row.teammates)).or_default();
        bucket.0.push(row.value);
        bucket.1.push(row.game_length);
    }

    buckets
        .into_iter()
        .map(|((enemies, teammates), (mut values, mut lengths))| StatRow {
            enemies,
            teammates,
            game_length: median(&mut lengths),
            value: median(&mut values)
        })
        .collect()
}

fn median(values: &mut [f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}

pub struct RegressionStatEngine {
    source: Arc<dyn HistoricalStatSource>
}

impl RegressionStatEngine {
    pub fn new(source: Arc<dyn HistoricalStatSource>) -> RegressionStatEngine {
        RegressionStatEngine { source }
    }

    /// Fits a baseline for the statistic from the matching history.
    ///
    /// Rankable (or absent) modes share one pooled baseline, non-rankable
    /// modes get their own. `team_count` is ignored for solo games.
    pub fn compute_model(
        &self,
        statistic: Statistic,
        game_type: GameType,
        mode: Option<&GameModeRow>,
        team_count: u8,
        arena: Option<i64>
    ) -> Result<CoefficientModel, RegressionError> {
        let query = BaselineQuery::new(statistic, game_type, mode, team_count, arena);
        self.compute_for_query(&query)
    }

    pub fn compute_for_query(&self, query: &BaselineQuery) -> Result<CoefficientModel, RegressionError> {
        let rows = self.source.rows(query)?;
        debug!("Fitting {:?} baseline from {} rows", query, rows.len());

        fit_best(&rows)
    }
}

/// Fits every feature expansion and keeps the one with the highest R².
/// A higher order model has to beat the current best by more than
/// [`R_SQUARED_TIE_EPSILON`] to replace it.
pub fn fit_best(rows: &[StatRow]) -> Result<CoefficientModel, RegressionError> {
    if rows.len() < MIN_REGRESSION_ROWS {
        return Err(RegressionError::InsufficientData {
            rows: rows.len(),
            required: MIN_REGRESSION_ROWS
        });
    }

    let mut best: Option<CoefficientModel> = None;
    for expansion in FeatureExpansion::iter() {
        let model = fit(rows, expansion)?;
        debug!("{} fit R² = {:.4}", expansion, model.r_squared);

        best = match best {
            Some(current) if model.r_squared <= current.r_squared + R_SQUARED_TIE_EPSILON => Some(current),
            _ => Some(model)
        };
    }

    best.ok_or_else(|| RegressionError::Solve("no feature expansion available".to_string()))
}

pub fn fit(rows: &[StatRow], expansion: FeatureExpansion) -> Result<CoefficientModel, RegressionError> {
    let x = DMatrix::from_row_iterator(
        rows.len(),
        expansion.width(),
        rows.iter()
            .flat_map(|r| expansion.expand(r.enemies as f64, r.teammates as f64, r.game_length))
    );
    let y = DVector::from_iterator(rows.len(), rows.iter().map(|r| r.value));

    let coefficients = ordinary_least_squares(&x, &y)?;
    let r_squared = r_squared(&x, &y, &coefficients);

    Ok(CoefficientModel {
        expansion,
        coefficients: coefficients.iter().copied().collect(),
        r_squared
    })
}

/// Least squares through SVD, so rank-deficient designs (e.g. solo games
/// where every teammate count is 0) still get a minimum-norm solution.
fn ordinary_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Result<DVector<f64>, RegressionError> {
    let svd = x.clone().svd(true, true);
    svd.solve(y, SVD_EPSILON)
        .map_err(|e| RegressionError::Solve(e.to_string()))
}

fn r_squared(x: &DMatrix<f64>, y: &DVector<f64>, coefficients: &DVector<f64>) -> f64 {
    let predicted = x * coefficients;
    let mean = y.mean();

    let ss_res: f64 = y.iter().zip(predicted.iter()).map(|(a, p)| (a - p).powi(2)).sum();
    let ss_tot: f64 = y.iter().map(|a| (a - mean).powi(2)).sum();

    if ss_tot == 0.0 {
        return if ss_res < SVD_EPSILON { 1.0 } else { 0.0 };
    }

    1.0 - ss_res / ss_tot
}
