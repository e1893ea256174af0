use std::sync::Arc;

use assignment_tracker::{
    auth::password::PasswordService, config::Config, create_router, db, storage::LocalBlobStore,
    AppState,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("assignment_tracker=debug,tower_http=info")),
        )
        .with_target(false)
        .with_level(true)
        .init();

    if let Err(e) = run().await {
        tracing::error!("Assignment Tracker failed: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("Assignment Tracker API - Starting...");

    let config = Config::from_env()?;

    tracing::info!("Connecting to database...");
    let db_pool = db::create_pool(&config.database_url).await?;
    db::run_migrations(&db_pool).await?;

    // Built before serving so the first unknown-username login is not slower
    tokio::task::spawn_blocking(PasswordService::dummy_hash).await??;

    let blobs = LocalBlobStore::new(&config.upload_dir);
    blobs.init().await?;

    let state = AppState::new(db_pool, &config, Arc::new(blobs));
    let app = create_router(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Assignment Tracker API is running on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
