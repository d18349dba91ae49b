//! vitals-ingest: synthetic vital-sign ingestion.
//!
//! This is the application entry point. It initializes tracing, loads settings
//! and database credentials, optionally applies migrations, sets up the Axum
//! router, and starts the HTTP server.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vitals_ingest::config::{
    AppConfig, DatabaseConfig, FileSettings, DEFAULT_CONFIG_PATH, DEFAULT_LOG_FILTER,
};
use vitals_ingest::http::start_server;
use vitals_ingest::store::PgVitalsStore;
use vitals_ingest::{create_router, AppState};

/// vitals-ingest: writes synthetic vital-sign readings to PostgreSQL
#[derive(Parser, Debug)]
#[command(name = "vitals-ingest", version, about)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    /// Log level filter (e.g., "vitals_ingest=debug,tower_http=info")
    #[arg(short, long)]
    log_level: Option<String>,

    /// Apply database migrations before serving
    #[arg(long)]
    migrate: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Logging format comes from the settings file, so read it before tracing is up
    let settings = FileSettings::load(&args.config)?;

    // Initialize tracing with priority: CLI > env > default
    let log_filter = args
        .log_level
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

    let registry =
        tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::new(&log_filter));
    if settings.logging.is_json() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    // Database credentials are required; a missing variable stops startup here
    let database = match DatabaseConfig::from_env() {
        Ok(database) => database,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            return Err(e.into());
        }
    };
    let config = AppConfig::from_parts(settings, database);

    tracing::info!(
        host = %config.http.host,
        port = config.http.port,
        database = %config.database.name,
        socket = %config.database.socket_dir().display(),
        "Loaded configuration"
    );

    let store = PgVitalsStore::new(&config.database);

    if args.migrate {
        store.migrate().await?;
        tracing::info!("Database migrations applied");
    }

    let http = config.http.clone();
    let state = AppState::new(config, store);
    let app = create_router(state);

    start_server(app, &http).await?;

    Ok(())
}
