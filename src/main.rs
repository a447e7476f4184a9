use dotenvy::dotenv;
use gym_ledger::{
    api::{self, AppState},
    config::{database, settings},
    core::{membership, plan},
    errors::Result,
};
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();

    // 3. Load the main application configuration
    let app_config = settings::load_app_configuration()
        .inspect_err(|e| error!("Failed to load configuration: {}", e))?;

    // 4. Open the store and make sure the schema exists
    let db = database::create_connection(&app_config.database.url)
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 5. Seed the plan catalog
    plan::seed_plans(&db, &app_config.plans).await?;

    // 6. Close out lapsed memberships now and on every interval
    let state = AppState::new(db);
    let period = Duration::from_secs(app_config.server.expiry_interval_secs.max(1));
    let expiry = membership::spawn_expiry_task(state.shared_db(), period);

    // 7. Serve until Ctrl-C
    let listener = tokio::net::TcpListener::bind(&app_config.server.bind_addr).await?;
    info!("Listening on {}", app_config.server.bind_addr);
    axum::serve(listener, api::build_router(state.clone()))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    expiry.abort();
    let _ = expiry.await;
    match state.into_db() {
        Ok(db) => {
            db.close().await?;
            info!("Database connection closed");
        }
        Err(_) => warn!("Database connection still shared at shutdown; dropping it"),
    }
    Ok(())
}
