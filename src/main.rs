mod lib;
use lib::aoi::AoiTable;
use lib::emitter::Emitter;
use lib::state_machine::LaneTracker;

mod settings;
use settings::AppSettings;

mod stream;

mod rest_api;

use std::env;
use std::fmt;
use std::process;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;

#[derive(Debug)]
enum AppError {
    Config(String),
    RestApi(std::io::Error),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(msg) => write!(f, "{}", msg),
            AppError::RestApi(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for AppError {}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::RestApi(e)
    }
}

/// Drains parsed detection records from `rx`, feeds each into the tracker,
/// and fires the emitter whenever `total_passed` just incremented (§4.7).
async fn run_tracker(tracker: Arc<Mutex<LaneTracker>>, emitter: Arc<Emitter>, mut rx: mpsc::Receiver<lib::detection::DetectionRecord>) {
    while let Some(record) = rx.recv().await {
        let outcome = {
            let mut guard = tracker.lock().expect("LaneTracker is poisoned [Mutex]");
            guard.ingest(&record)
        };
        if outcome.incremented {
            let emitter = emitter.clone();
            tokio::spawn(async move {
                if let Err(err) = emitter.send(outcome.total_passed).await {
                    log::warn!("failed to report total_passed={}: {}", outcome.total_passed, err);
                }
            });
        }
    }
}

async fn run(settings: AppSettings) -> Result<(), AppError> {
    log::info!("REST API is '{}'", settings.rest_api.enable);

    let aoi_table: AoiTable = settings.aoi.as_table();
    let tracker = Arc::new(Mutex::new(LaneTracker::new(aoi_table)));

    let role = settings.aggregator.get_role().map_err(|err| AppError::Config(err.to_string()))?;
    let emitter = Arc::new(Emitter::new(settings.aggregator.endpoint.clone(), role));

    stream::ensure_fifo(&settings.stream.fifo_path)?;
    let (tx, rx) = mpsc::channel(64);
    let fifo_path = settings.stream.fifo_path.clone();
    let backoff = Duration::from_millis(settings.stream.reconnect_backoff_millis);
    tokio::spawn(stream::run(fifo_path, backoff, tx));

    tokio::spawn(run_tracker(tracker.clone(), emitter, rx));

    if settings.rest_api.enable {
        let host = settings.rest_api.host.clone();
        let port = settings.rest_api.back_end_port;
        let rest_tracker = tracker.clone();
        let rest_settings = settings.clone();
        tokio::spawn(async move {
            if let Err(err) = rest_api::start_rest_api(host, port, rest_tracker, rest_settings).await {
                log::error!("REST API stopped due to an error: {}", err);
            }
        });
    }

    log::info!("Press `Ctrl-C` to stop");
    let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
    ctrlc::set_handler(move || {
        log::info!("Ctrl+C has been pressed! Shutting down");
        let _ = shutdown_tx.try_send(());
    })
    .expect("Error setting `Ctrl-C` handler");

    shutdown_rx.recv().await;
    Ok(())
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let path_to_config = match args.len() {
        2 => &args[1],
        _ => {
            log::warn!("Args should contain exactly one string: path to TOML configuration file. Setting to default './data/conf.toml'");
            "./data/conf.toml"
        }
    };
    let app_settings = AppSettings::new(path_to_config);
    log::info!("Settings are:\n\t{}", app_settings);

    if let Err(err) = run(app_settings).await {
        log::error!("Error in main task: {}", err);
        process::exit(1);
    }
}
