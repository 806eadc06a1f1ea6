use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    sync::RwLock
};

use serde::de::DeserializeOwned;
use tracing::{info, warn};

use crate::{
    error::{RegressionError, StorageError},
    model::{
        baseline_store::BaselinePersistence,
        game::Game,
        modes::{registry::ModeCatalog, GameModeRow},
        regression::{aggregate_medians, BaselineQuery, CoefficientModel, HistoricalStatSource, RawStatRow, StatRow}
    }
};

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, StorageError> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Historical per-player rows read from a JSON array.
pub struct JsonHistorySource {
    rows: Vec<RawStatRow>
}

impl JsonHistorySource {
    pub fn load(path: &Path) -> Result<JsonHistorySource, StorageError> {
        let rows: Vec<RawStatRow> = read_json(path)?;
        info!("Loaded {} historical rows from {}", rows.len(), path.display());

        Ok(JsonHistorySource { rows })
    }

    pub fn from_rows(rows: Vec<RawStatRow>) -> JsonHistorySource {
        JsonHistorySource { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct arenas present in the history, sorted, `None` first.
    pub fn arenas(&self) -> Vec<Option<i64>> {
        let mut arenas: Vec<Option<i64>> = self.rows.iter().map(|r| r.arena).collect();
        arenas.sort();
        arenas.dedup();
        arenas
    }
}

impl HistoricalStatSource for JsonHistorySource {
    fn rows(&self, query: &BaselineQuery) -> Result<Vec<StatRow>, RegressionError> {
        Ok(aggregate_medians(self.rows.iter().filter(|r| query.matches(r))))
    }
}

/// Baselines persisted as one JSON object keyed by the baseline key. Every
/// successful `set` rewrites the whole file.
pub struct JsonBaselineFile {
    path: PathBuf,
    values: RwLock<BTreeMap<String, CoefficientModel>>
}

impl JsonBaselineFile {
    /// Opens the cache file. A missing file is an empty cache.
    pub fn open(path: &Path) -> Result<JsonBaselineFile, StorageError> {
        let values = if path.exists() {
            read_json(path)?
        } else {
            BTreeMap::new()
        };

        Ok(JsonBaselineFile {
            path: path.to_path_buf(),
            values: RwLock::new(values)
        })
    }

    pub fn len(&self) -> usize {
        self.values.read().map(|v| v.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn write(&self, values: &BTreeMap<String, CoefficientModel>) -> Result<(), StorageError> {
        let content = serde_json::to_string_pretty(values)?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

impl BaselinePersistence for JsonBaselineFile {
    fn get(&self, key: &str) -> Option<CoefficientModel> {
        self.values.read().ok().and_then(|values| values.get(key).cloned())
    }

    fn set(&self, key: &str, model: &CoefficientModel) -> bool {
        let Ok(mut values) = self.values.write() else {
            return false;
        };
        values.insert(key.to_string(), model.clone());

        match self.write(&values) {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to write baseline cache {}: {}", self.path.display(), e);
                false
            }
        }
    }
}

pub fn load_modes(path: &Path) -> Result<ModeCatalog, StorageError> {
    let rows: Vec<GameModeRow> = read_json(path)?;
    info!("Loaded {} game modes from {}", rows.len(), path.display());

    Ok(ModeCatalog::new(rows))
}

/// Reads either a single game object or an array of games.
pub fn load_games(path: &Path) -> Result<Vec<Game>, StorageError> {
    let value: serde_json::Value = read_json(path)?;
    let games = match value {
        serde_json::Value::Array(_) => serde_json::from_value(value)?,
        _ => vec![serde_json::from_value(value)?]
    };

    Ok(games)
}

#[cfg(test)]
mod tests {
    use super::{load_games, JsonBaselineFile, JsonHistorySource};
    use crate::{
        error::StorageError,
        model::{
            baseline_store::BaselinePersistence,
            regression::{BaselineQuery, CoefficientModel, HistoricalStatSource},
            structures::{game_type::GameType, statistic::Statistic, system::System}
        },
        utils::test_utils::{generate_raw_row, generate_solo_game}
    };
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_history_filters_and_aggregates() {
        let mut other_arena = generate_raw_row(Statistic::Hits, 3, 0, 15.0, 40.0);
        other_arena.arena = Some(2);
        let mut arena_row = generate_raw_row(Statistic::Hits, 3, 0, 15.0, 20.0);
        arena_row.arena = Some(1);

        let source = JsonHistorySource::from_rows(vec![
            arena_row,
            other_arena,
            generate_raw_row(Statistic::Deaths, 3, 0, 15.0, 7.0),
        ]);

        let query = BaselineQuery::new(Statistic::Hits, GameType::Solo, None, 0, Some(1));
        let rows = source.rows(&query).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].value, 20.0);
        assert_eq!(source.arenas(), vec![None, Some(1), Some(2)]);
    }

    #[test]
    fn test_history_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.json");
        let rows = vec![generate_raw_row(Statistic::Hits, 5, 0, 12.0, 9.0)];
        fs::write(&path, serde_json::to_string(&rows).unwrap()).unwrap();

        let source = JsonHistorySource::load(&path).unwrap();

        assert_eq!(source.len(), 1);
    }

    #[test]
    fn test_baseline_file_persists() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("baselines.json");
        let model = CoefficientModel::linear(vec![1.0, 2.0, 0.5, 0.25]);

        let file = JsonBaselineFile::open(&path).unwrap();
        assert!(file.is_empty());
        assert!(file.set("hitsModelSOLO", &model));

        let reopened = JsonBaselineFile::open(&path).unwrap();
        assert_eq!(reopened.get("hitsModelSOLO"), Some(model));
        assert_eq!(reopened.get("deathsModelSOLO"), None);
    }

    #[test]
    fn test_baseline_file_unwritable() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("baselines.json");

        let file = JsonBaselineFile::open(&path).unwrap();

        assert!(!file.set("hitsModelSOLO", &CoefficientModel::constant(1.0)));
        // The value is still served from memory
        assert!(file.get("hitsModelSOLO").is_some());
    }

    #[test]
    fn test_corrupt_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("baselines.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(matches!(JsonBaselineFile::open(&path), Err(StorageError::Serialization(_))));
    }

    #[test]
    fn test_load_single_or_many_games() {
        let dir = tempdir().unwrap();
        let game = generate_solo_game(System::Evo5, &[(10, 5, 2)]);

        let single = dir.path().join("game.json");
        fs::write(&single, serde_json::to_string(&game).unwrap()).unwrap();
        assert_eq!(load_games(&single).unwrap(), vec![game.clone()]);

        let many = dir.path().join("games.json");
        fs::write(&many, serde_json::to_string(&vec![game.clone(), game]).unwrap()).unwrap();
        assert_eq!(load_games(&many).unwrap().len(), 2);
    }
}
