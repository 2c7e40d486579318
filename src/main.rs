use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use medrec_core::config::database_path_from_env_value;
use medrec_core::db::initialise_database;
use medrec_core::CoreConfig;

/// Main entry point for the medication catalog
///
/// Resolves configuration once, makes sure the database schema is current and
/// then serves the read-only REST API until interrupted.
///
/// # Environment Variables
/// - `MEDREC_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `MEDREC_DB_PATH`: SQLite database file (default: "medications.sqlite3")
/// - `RUST_LOG`: tracing filter directives
///
/// Variables may also be supplied through a `.env` file in the working directory.
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the database cannot be opened or migrated,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("medrec_run=info".parse()?)
                .add_directive("medrec_core=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var("MEDREC_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let database_path = database_path_from_env_value(std::env::var("MEDREC_DB_PATH").ok());

    let cfg = Arc::new(CoreConfig::new(database_path)?);
    initialise_database(&cfg)?;

    tracing::info!("++ Starting medication catalog REST on {}", rest_addr);
    tracing::info!("++ Using database {}", cfg.database_path().display());

    let app = api_rest::router(api_rest::AppState::new(cfg));

    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("-- Medication catalog stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
