use dotenv::dotenv;
use std::env;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;
use tracing::{event, Level};
use tracing_subscriber::EnvFilter;

use taskboard::config::{Config, DEFAULT_CONFIG_PATH};
use taskboard::controller::{ServerConfig, TaskController};
use taskboard::datastore::{FileTaskStorage, SerialDataStore};
use taskboard::log;

fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let config_path =
        env::var("TASKBOARD_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config = Config::load(&config_path)?.with_port_override(env::var("PORT").ok())?;

    let env_filter = EnvFilter::try_from_env("TASKBOARD_LOG");
    log::setup(env_filter, config.log.as_ref());

    event!(Level::INFO, "Starting TaskBoard: {}", env!("CARGO_PKG_VERSION"));

    let storage = FileTaskStorage::new(&config.storage.path);
    event!(Level::INFO, path = %storage.path().display(), "Using task file.");
    let datastore = Arc::new(SerialDataStore::new(storage));

    let server_config = ServerConfig {
        addr: config.listen.socket_addr()?,
        timeout: config.listen.timeout,
    };
    let controller = TaskController::start(datastore, server_config)?;

    let term = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register(signal_hook::consts::SIGTERM, term.clone())?;
    signal_hook::flag::register(signal_hook::consts::SIGINT, term.clone())?;

    while !term.load(Ordering::Acquire) {
        std::thread::sleep(Duration::from_millis(100));
    }
    event!(Level::INFO, "Shutting down.");
    controller.stop()?;
    Ok(())
}
