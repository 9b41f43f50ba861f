use anyhow::Result;
use clap::Parser;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

use cinelink_api::http;
use cinelink_core::provider::YtsClient;
use cinelink_core::repository::{ReportRepository, UserRepository, WatchSourceRepository};
use cinelink_core::service::{JwtService, ReportService, SourceResolver, SourceService};
use cinelink_core::{logging, Config};

#[derive(Debug, Parser)]
#[command(name = "cinelink-api", about = "Watch-source resolution service")]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, env = "CINELINK_CONFIG")]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let config = Config::load(args.config.as_deref()).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}");
        eprintln!("Using default configuration");
        Config::default()
    });

    // Initialize logging
    logging::init_logging(&config.logging)?;

    info!("Cinelink API server starting...");
    info!("HTTP address: {}", config.http_address());

    // Initialize database pool
    let pool: sqlx::PgPool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .acquire_timeout(Duration::from_secs(config.database.connect_timeout_seconds))
        .idle_timeout(Duration::from_secs(config.database.idle_timeout_seconds))
        .connect(&config.database.url)
        .await
        .map_err(|e| {
            error!("Failed to connect to database: {}", e);
            anyhow::anyhow!("Database connection failed: {e}")
        })?;

    info!("Database connected successfully");

    // Run migrations
    info!("Running database migrations...");
    sqlx::migrate!("../migrations")
        .run(&pool)
        .await
        .map_err(|e| {
            error!("Failed to run migrations: {}", e);
            anyhow::anyhow!("Migration failed: {e}")
        })?;
    info!("Migrations completed");

    // Repositories behind their service ports
    let sources = Arc::new(WatchSourceRepository::new(pool.clone()));
    let reports = Arc::new(ReportRepository::new(pool.clone()));
    let users = Arc::new(UserRepository::new(pool.clone()));

    // Torrent index client (best-effort producer)
    let torrent_index = Arc::new(YtsClient::new(&config.torrent_index)?);
    if config.torrent_index.enabled {
        info!("Torrent index client: {}", config.torrent_index.base_url);
    } else {
        info!("Torrent index disabled by configuration");
    }

    // Services
    let jwt_service = JwtService::new(
        config.jwt.secret.as_bytes(),
        config.jwt.access_token_duration_hours,
    );
    let resolver = Arc::new(SourceResolver::new(sources.clone(), torrent_index));
    let source_service = Arc::new(SourceService::new(sources.clone(), reports.clone()));
    let report_service = Arc::new(ReportService::new(sources, reports));
    info!("Services initialized");

    let state = http::AppState {
        resolver,
        source_service,
        report_service,
        users,
        jwt_service,
        pool,
    };

    let router = http::create_router(state);

    let listener = tokio::net::TcpListener::bind(config.http_address()).await?;
    info!("Listening on {}", config.http_address());

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
}
