use std::sync::{Arc, Mutex};

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::infrastructure::bootstrap::bootstrap;
use crate::infrastructure::config::{config_path, load_config};
use crate::interfaces::http::{add_log, start_server, LogEntry};

pub async fn run() -> std::io::Result<()> {
    let _ = dotenvy::dotenv();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .try_init();

    let config = load_config().map_err(|err| {
        error!(error = %err, path = %config_path().display(), "Failed to load configuration");
        std::io::Error::new(std::io::ErrorKind::InvalidInput, err.to_string())
    })?;

    let logs: Arc<Mutex<Vec<LogEntry>>> = Arc::new(Mutex::new(Vec::new()));
    let server_config = config.server.clone();

    let state = bootstrap(config).await.map_err(|err| {
        error!(error = %err, "Failed to bootstrap application state");
        std::io::Error::new(std::io::ErrorKind::Other, err.to_string())
    })?;

    add_log(
        &logs,
        "INFO",
        "Bootstrap",
        &format!("Serving table '{}'", state.layout.table),
    );
    info!(table = %state.layout.table, "Consolidador started");

    start_server(Arc::new(state), logs, &server_config)?.await
}
