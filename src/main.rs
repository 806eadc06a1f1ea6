use std::{io, path::Path, process::ExitCode, sync::Arc};

use clap::Parser;
use dotenv::dotenv;
use indexmap::IndexMap;
use serde::Serialize;
use tracing::{error, info, warn};
use tracing_indicatif::IndicatifLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use lasertag_results::{
    args::{Args, Command},
    database::json_store::{load_games, load_modes, JsonBaselineFile, JsonHistorySource},
    env::{configure_threads, get_env, EngineSettings},
    error::{EngineError, StorageError},
    model::{
        baseline_store::StatBaselineStore,
        events::GameEvent,
        modes::{
            registry::{GameModeRegistry, ModeCatalog},
            GameLoad
        },
        pipeline::{ProcessedGame, ResultsPipeline},
        regression::RegressionStatEngine
    }
};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProcessOutput {
    #[serde(flatten)]
    processed: ProcessedGame,
    /// Scoring rules as they are written to the game row
    scoring_fields: IndexMap<&'static str, i64>
}

fn main() -> ExitCode {
    // RUST_LOG and MODES_FILE may come from .env
    dotenv().ok();
    let args = Args::parse();

    let indicatif_layer = IndicatifLayer::new();
    tracing_subscriber::registry()
        .with(EnvFilter::new(&args.log_level))
        .with(tracing_subscriber::fmt::layer().with_writer(indicatif_layer.get_stderr_writer()))
        .with(indicatif_layer)
        .init();

    let settings = get_env();
    configure_threads(settings.worker_threads);

    match run(&args, &settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args, settings: &EngineSettings) -> Result<(), EngineError> {
    let catalog = match &args.modes {
        Some(path) => load_modes(path)?,
        None => ModeCatalog::default()
    };

    match &args.command {
        Command::Recompute { history, arenas } => recompute(settings, history.as_deref(), arenas, &catalog),
        Command::Process { game, events } => process(settings, game, events.as_deref(), catalog),
        Command::Load {
            mode,
            system,
            game_type,
            load
        } => {
            let pipeline = pipeline(settings, None, catalog)?;
            let mut game_load: GameLoad = read_file(load)?;
            pipeline.prepare_load(mode, *system, *game_type, &mut game_load)?;
            print_json(&game_load)
        }
    }
}

fn recompute(
    settings: &EngineSettings,
    history: Option<&Path>,
    arenas: &[i64],
    catalog: &ModeCatalog
) -> Result<(), EngineError> {
    let path = history.or(settings.history_path.as_deref()).ok_or_else(|| {
        StorageError::Io(io::Error::new(
            io::ErrorKind::NotFound,
            "no history file given (--history or HISTORY_FILE)"
        ))
    })?;
    let source = JsonHistorySource::load(path)?;

    let mut targets = vec![None];
    if arenas.is_empty() {
        targets.extend(source.arenas().into_iter().flatten().map(Some));
    } else {
        targets.extend(arenas.iter().copied().map(Some));
    }

    let persistence = Arc::new(JsonBaselineFile::open(&settings.baseline_cache_path)?);
    let store = StatBaselineStore::new(RegressionStatEngine::new(Arc::new(source)), persistence);

    let report = store.recompute_all(&targets, catalog.rows());
    info!(
        "Baselines written to {} ({} of {} computed)",
        settings.baseline_cache_path.display(),
        report.computed,
        report.total()
    );

    Ok(())
}

fn process(
    settings: &EngineSettings,
    game_path: &Path,
    events_path: Option<&Path>,
    catalog: ModeCatalog
) -> Result<(), EngineError> {
    let history = match &settings.history_path {
        Some(path) => Some(JsonHistorySource::load(path)?),
        None => None
    };
    let pipeline = pipeline(settings, history, catalog)?;
    let mut games = load_games(game_path)?;

    if let Some(path) = events_path {
        let events: Vec<GameEvent> = read_file(path)?;
        match games.as_mut_slice() {
            [game] => {
                let handled = pipeline.replay_events(game, &events)?;
                info!("Replayed {} of {} events onto {}", handled, events.len(), game.code);
            }
            _ => warn!("Events can only be replayed onto a single game, ignoring {}", path.display())
        }
    }

    let mut output = Vec::with_capacity(games.len());
    for result in pipeline.process_batch(&games) {
        match result {
            Ok(processed) => {
                let scoring_fields = processed.game.scoring.to_storage_fields(settings.scoring_mapping);
                output.push(ProcessOutput {
                    processed,
                    scoring_fields
                });
            }
            Err(e) => error!("{}", e)
        }
    }

    print_json(&output)
}

fn pipeline(
    settings: &EngineSettings,
    history: Option<JsonHistorySource>,
    catalog: ModeCatalog
) -> Result<ResultsPipeline, EngineError> {
    let registry = GameModeRegistry::with_defaults().with_rows(Arc::new(catalog));
    let source = history.unwrap_or_else(|| JsonHistorySource::from_rows(Vec::new()));
    let persistence = Arc::new(JsonBaselineFile::open(&settings.baseline_cache_path)?);
    let baselines = StatBaselineStore::new(RegressionStatEngine::new(Arc::new(source)), persistence);

    Ok(ResultsPipeline::new(Arc::new(registry), Arc::new(baselines)))
}

fn read_file<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, StorageError> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), EngineError> {
    let json = serde_json::to_string_pretty(value).map_err(StorageError::from)?;
    println!("{}", json);
    Ok(())
}
