// API Server Binary Entry Point
//
// Purpose: Start the Axum server for fertilizer recommendation and nutrient plans
// Usage: cargo run --features api --bin api_server

use fertilizer_advisor::{create_router, AppState};
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing (structured logging)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    // Default log level: info for our crate, warn for others
                    "fertilizer_advisor=info,tower_http=debug,axum=debug,warn".into()
                }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting API server...");

    // Configuration from environment variables
    let model_path = std::env::var("MODEL_PATH")
        .unwrap_or_else(|_| "models/fertilizer_model.json".to_string());

    let reference_path = std::env::var("REFERENCE_DATA").ok();

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(5000);

    tracing::info!("Configuration:");
    tracing::info!("  MODEL_PATH: {}", model_path);
    tracing::info!("  REFERENCE_DATA: {}", reference_path.as_deref().unwrap_or("<built-in>"));
    tracing::info!("  PORT: {}", port);

    // Reference data errors are fatal; a missing model only disables /recommend
    let state = AppState::load(&model_path, reference_path.as_deref())?;

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .await?;

    Ok(())
}
