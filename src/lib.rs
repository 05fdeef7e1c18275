pub mod api;
pub mod config;
pub mod db;
pub mod forms;
pub mod models;
pub mod pipeline;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Failures that stop the service before it can serve requests.
#[derive(Error, Debug)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] db::DatabaseError),

    #[error("Server error: {0}")]
    Server(String),
}

/// Start the service and block until Ctrl-C.
pub async fn run() -> Result<(), StartupError> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = config::AppConfig::from_env()?;

    // Apply migrations once before any request opens a connection
    db::sqlite::open_database(&config.database_path)?;
    tracing::info!(
        database = %config.database_path.display(),
        prediction_url = %config.prediction_url,
        "Configuration loaded"
    );

    let mut server = api::start_api_server(&config)
        .await
        .map_err(StartupError::Server)?;
    tracing::info!(addr = %server.addr, "Listening");

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Cannot listen for shutdown signal: {e}");
    }
    server.shutdown();
    server.stopped().await;
    Ok(())
}
