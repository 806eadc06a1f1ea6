use std::{
    collections::HashMap,
    sync::{Arc, RwLock}
};

use strum::IntoEnumIterator;
use tracing::{debug, warn};

use crate::{
    error::EngineError,
    model::{
        game::Game,
        modes::{
            builtin::{register_builtin, CUSTOM_SOLO, CUSTOM_TEAM, DEATHMATCH, TEAM_DEATHMATCH},
            laserforce::register_laserforce,
            lasermaxx::register_lasermaxx,
            mode_class_name, GameModeRow, GameModeVariant
        },
        structures::{game_type::GameType, system::System}
    }
};

pub type ModeFactory = fn(Option<System>, Option<&GameModeRow>) -> Arc<dyn GameModeVariant>;

/// Where stored mode rows come from.
pub trait ModeRowSource: Send + Sync {
    fn find_by_name(&self, name: &str, game_type: GameType) -> Option<GameModeRow>;

    fn find_by_id(&self, id: i64) -> Option<GameModeRow>;
}

/// In-memory list of stored modes.
#[derive(Debug, Clone, Default)]
pub struct ModeCatalog {
    rows: Vec<GameModeRow>
}

impl ModeCatalog {
    pub fn new(rows: Vec<GameModeRow>) -> ModeCatalog {
        ModeCatalog { rows }
    }

    pub fn rows(&self) -> &[GameModeRow] {
        &self.rows
    }
}

impl ModeRowSource for ModeCatalog {
    fn find_by_name(&self, name: &str, game_type: GameType) -> Option<GameModeRow> {
        let normalized = mode_class_name(name);
        self.rows
            .iter()
            .find(|r| r.game_type == game_type && mode_class_name(&r.name) == normalized)
            .cloned()
    }

    fn find_by_id(&self, id: i64) -> Option<GameModeRow> {
        self.rows.iter().find(|r| r.id == id).cloned()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum ModeKey {
    Row(i64),
    Name(String)
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ResolutionKey {
    systems: Vec<System>,
    game_type: GameType,
    mode: ModeKey
}

/// Maps (system, mode name, game type) to a variant factory and memoizes
/// every resolution.
pub struct GameModeRegistry {
    factories: HashMap<(Option<System>, String, GameType), ModeFactory>,
    active_systems: Vec<System>,
    rows: Option<Arc<dyn ModeRowSource>>,
    resolved: RwLock<HashMap<ResolutionKey, Arc<dyn GameModeVariant>>>
}

impl GameModeRegistry {
    /// An empty registry. `active_systems` is the order systems are tried in
    /// when a lookup does not name any.
    pub fn new(active_systems: Vec<System>) -> GameModeRegistry {
        GameModeRegistry {
            factories: HashMap::new(),
            active_systems,
            rows: None,
            resolved: RwLock::new(HashMap::new())
        }
    }

    /// Registry with the builtin and every vendor mode, all systems active.
    pub fn with_defaults() -> GameModeRegistry {
        let mut registry = GameModeRegistry::new(System::iter().collect());
        register_builtin(&mut registry);
        register_lasermaxx(&mut registry);
        register_laserforce(&mut registry);

        registry
    }

    pub fn with_rows(mut self, rows: Arc<dyn ModeRowSource>) -> GameModeRegistry {
        self.rows = Some(rows);
        self
    }

    /// `system` of `None` makes the mode available on every system.
    pub fn register(&mut self, system: Option<System>, name: &str, game_type: GameType, factory: ModeFactory) {
        self.factories.insert((system, name.to_string(), game_type), factory);
    }

    pub fn active_systems(&self) -> &[System] {
        &self.active_systems
    }

    /// Resolves a free-text mode name. `systems` is a single system, a comma
    /// separated list or `None` for every active system.
    pub fn resolve(
        &self,
        name: &str,
        systems: Option<&str>,
        game_type: GameType
    ) -> Result<Arc<dyn GameModeVariant>, EngineError> {
        let key = ResolutionKey {
            systems: self.systems(systems),
            game_type,
            mode: ModeKey::Name(mode_class_name(name))
        };

        self.resolve_cached(key, name, || {
            self.rows.as_ref().and_then(|r| r.find_by_name(name, game_type))
        })
    }

    /// Resolves a stored mode row, restricted to the row's own systems when
    /// no systems are given.
    pub fn resolve_row(
        &self,
        row: &GameModeRow,
        systems: Option<&str>
    ) -> Result<Arc<dyn GameModeVariant>, EngineError> {
        let key = ResolutionKey {
            systems: self.systems(systems.or(row.systems.as_deref())),
            game_type: row.game_type,
            mode: ModeKey::Row(row.id)
        };

        self.resolve_cached(key, &row.name, || Some(row.clone()))
    }

    /// Resolves the mode a game was played in, on the game's own system.
    pub fn resolve_game(&self, game: &Game) -> Result<Arc<dyn GameModeVariant>, EngineError> {
        let key = ResolutionKey {
            systems: vec![game.system],
            game_type: game.game_type,
            mode: match game.mode.id {
                Some(id) => ModeKey::Row(id),
                None => ModeKey::Name(mode_class_name(&game.mode.name))
            }
        };

        self.resolve_cached(key, &game.mode.name, || {
            self.rows.as_ref().and_then(|rows| match game.mode.id {
                Some(id) => rows.find_by_id(id),
                None => rows.find_by_name(&game.mode.name, game.game_type)
            })
        })
    }

    fn systems(&self, systems: Option<&str>) -> Vec<System> {
        let parsed = systems.map(System::parse_list).unwrap_or_default();
        if parsed.is_empty() {
            return self.active_systems.clone();
        }

        parsed
    }

    /// Stored rows are only fetched on a cache miss.
    fn resolve_cached(
        &self,
        key: ResolutionKey,
        name: &str,
        fetch_row: impl FnOnce() -> Option<GameModeRow>
    ) -> Result<Arc<dyn GameModeVariant>, EngineError> {
        if let Some(mode) = self.resolved.read().ok().and_then(|cache| cache.get(&key).cloned()) {
            return Ok(mode);
        }

        let row = fetch_row();
        let class_name = mode_class_name(name);
        let mode = self.build(&class_name, row.as_ref(), &key.systems, key.game_type).ok_or_else(|| {
            warn!("No game mode for '{}' ({}) on {:?}", name, key.game_type, key.systems);
            EngineError::GameModeNotFound {
                name: name.to_string(),
                game_type: key.game_type,
                systems: key.systems.clone()
            }
        })?;

        match self.resolved.write() {
            Ok(mut cache) => Ok(cache.entry(key).or_insert(mode).clone()),
            Err(_) => Ok(mode)
        }
    }

    fn build(
        &self,
        class_name: &str,
        row: Option<&GameModeRow>,
        systems: &[System],
        game_type: GameType
    ) -> Option<Arc<dyn GameModeVariant>> {
        let candidates = [class_name.to_string(), class_name.to_uppercase()];

        for system in systems {
            for candidate in &candidates {
                let factory = self
                    .factories
                    .get(&(Some(*system), candidate.clone(), game_type))
                    .or_else(|| self.factories.get(&(None, candidate.clone(), game_type)));

                if let Some(factory) = factory {
                    debug!("Resolved mode '{}' to {} on {}", class_name, candidate, system);
                    return Some(factory(Some(*system), row));
                }
            }
        }

        let fallback = match (row.is_some(), game_type) {
            (true, GameType::Team) => CUSTOM_TEAM,
            (true, GameType::Solo) => CUSTOM_SOLO,
            (false, GameType::Team) => TEAM_DEATHMATCH,
            (false, GameType::Solo) => DEATHMATCH
        };
        debug!("Mode '{}' has no dedicated variant, falling back to {}", class_name, fallback);

        self.factories
            .get(&(None, fallback.to_string(), game_type))
            .map(|factory| factory(systems.first().copied(), row))
    }
}

#[cfg(test)]
mod tests {
    use super::{GameModeRegistry, ModeCatalog, ModeRowSource};
    use crate::{
        error::EngineError,
        model::{
            modes::{builtin::register_builtin, GameModeRow},
            structures::{game_type::GameType, system::System}
        },
        utils::test_utils::{generate_mode_row, generate_solo_game, generate_team_game}
    };
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc
    };

    /// Catalog that counts how often it is asked for rows.
    struct CountingCatalog {
        catalog: ModeCatalog,
        fetches: AtomicUsize
    }

    impl ModeRowSource for CountingCatalog {
        fn find_by_name(&self, name: &str, game_type: GameType) -> Option<GameModeRow> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.catalog.find_by_name(name, game_type)
        }

        fn find_by_id(&self, id: i64) -> Option<GameModeRow> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.catalog.find_by_id(id)
        }
    }

    #[test]
    fn test_vendor_mode_lookup() {
        let registry = GameModeRegistry::with_defaults();

        let csgo = registry.resolve("CSGO", Some("evo5"), GameType::Team).unwrap();
        assert_eq!(csgo.id(), "evo5:CSGO");

        let sm5 = registry.resolve("sm5", Some("laserforce"), GameType::Team).unwrap();
        assert_eq!(sm5.id(), "laserforce:SM5");

        let bases = registry.resolve("Základny", Some("evo6"), GameType::Team).unwrap();
        assert_eq!(bases.id(), "evo6:Zakladny");
    }

    #[test]
    fn test_system_list_is_tried_in_order() {
        let registry = GameModeRegistry::with_defaults();

        // SM5 only exists on LaserForce
        let sm5 = registry.resolve("SM5", Some("evo5, laserforce"), GameType::Team).unwrap();
        assert_eq!(sm5.id(), "laserforce:SM5");

        let any = registry.resolve("SM5", None, GameType::Team).unwrap();
        assert_eq!(any.id(), "laserforce:SM5");

        let csgo = registry.resolve("CSGO", None, GameType::Team).unwrap();
        assert_eq!(csgo.id(), "evo5:CSGO");
    }

    #[test]
    fn test_fallback_without_row() {
        let registry = GameModeRegistry::with_defaults();

        let team = registry.resolve("Unknown mode", Some("evo5"), GameType::Team).unwrap();
        assert_eq!(team.id(), "evo5:TeamDeathmatch");

        let solo = registry.resolve("Unknown mode", Some("laserforce"), GameType::Solo).unwrap();
        assert_eq!(solo.id(), "laserforce:Deathmatch");
    }

    #[test]
    fn test_fallback_with_row() {
        let catalog = ModeCatalog::new(vec![generate_mode_row(4, "Zombies", GameType::Team, false)]);
        let registry = GameModeRegistry::with_defaults().with_rows(Arc::new(catalog));

        let mode = registry.resolve("zombies", Some("evo6"), GameType::Team).unwrap();

        assert_eq!(mode.id(), "evo6:Zombies#4");
        assert!(!mode.is_rankable());
    }

    #[test]
    fn test_resolve_row_uses_row_systems() {
        let mut row = generate_mode_row(9, "CSGO", GameType::Team, true);
        row.systems = Some("evo6".to_string());
        let registry = GameModeRegistry::with_defaults();

        let mode = registry.resolve_row(&row, None).unwrap();

        assert_eq!(mode.id(), "evo6:CSGO#9");
    }

    #[test]
    fn test_resolution_is_memoized() {
        let registry = GameModeRegistry::with_defaults();

        let first = registry.resolve("Survival", Some("evo5"), GameType::Solo).unwrap();
        let second = registry.resolve("survival", Some("evo5"), GameType::Solo).unwrap();
        let other_system = registry.resolve("Survival", Some("evo6"), GameType::Solo).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert!(!Arc::ptr_eq(&first, &other_system));
    }

    #[test]
    fn test_cached_resolution_skips_row_fetch() {
        let rows = Arc::new(CountingCatalog {
            catalog: ModeCatalog::new(vec![generate_mode_row(4, "Zombies", GameType::Team, false)]),
            fetches: AtomicUsize::new(0)
        });
        let registry = GameModeRegistry::with_defaults().with_rows(rows.clone());

        let first = registry.resolve("Zombies", Some("evo6"), GameType::Team).unwrap();
        let second = registry.resolve("zombies", Some("evo6"), GameType::Team).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(rows.fetches.load(Ordering::SeqCst), 1);

        let mut game = generate_team_game(System::Evo6, 2, 1);
        game.mode.name = "Zombies".to_string();
        game.mode.id = Some(4);
        let from_game = registry.resolve_game(&game).unwrap();
        let again = registry.resolve_game(&game).unwrap();

        assert!(Arc::ptr_eq(&from_game, &again));
        assert_eq!(from_game.id(), "evo6:Zombies#4");
        assert_eq!(rows.fetches.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_resolve_game() {
        let registry = GameModeRegistry::with_defaults();
        let mut game = generate_solo_game(System::Evo6, &[(1, 1, 1)]);
        game.mode.name = "Survival".to_string();

        let mode = registry.resolve_game(&game).unwrap();

        assert_eq!(mode.id(), "evo6:Survival");
        assert!(mode.as_modify_results().is_some());
    }

    #[test]
    fn test_not_found_without_fallback() {
        let registry = GameModeRegistry::new(vec![System::Evo5]);

        match registry.resolve("CSGO", None, GameType::Team) {
            Err(EngineError::GameModeNotFound { name, systems, .. }) => {
                assert_eq!(name, "CSGO");
                assert_eq!(systems, vec![System::Evo5]);
            }
            other => panic!("Expected GameModeNotFound, got {:?}", other.map(|m| m.id().to_string()))
        }

        let mut builtin_only = GameModeRegistry::new(vec![System::Evo5]);
        register_builtin(&mut builtin_only);
        assert!(builtin_only.resolve("CSGO", None, GameType::Team).is_ok());
    }
}
