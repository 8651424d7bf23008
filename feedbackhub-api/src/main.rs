//! # FeedbackHub API Server
//!
//! Loads configuration, connects to PostgreSQL, applies migrations and
//! serves the REST API until Ctrl+C.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p feedbackhub-api
//! ```

use std::sync::Arc;

use feedbackhub_api::{
    app::{build_router, AppState},
    config::Config,
};
use feedbackhub_shared::{
    ai::{gemini::GeminiDrafter, AiDrafter, DisabledDrafter},
    db::{
        migrations::run_migrations,
        pool::{close_pool, create_pool, DatabaseConfig},
    },
    store::postgres::PgStore,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "feedbackhub_api=debug,feedbackhub_shared=info,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "FeedbackHub API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;

    let pool = create_pool(DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;
    run_migrations(&pool).await?;

    let ai: Arc<dyn AiDrafter> = match config.ai.gemini() {
        Some(gemini) => {
            let drafter = GeminiDrafter::new(gemini)?;
            tracing::info!(model = drafter.model(), "AI drafting enabled");
            Arc::new(drafter)
        }
        None => {
            tracing::warn!("GEMINI_API_KEY not set, AI drafting disabled");
            Arc::new(DisabledDrafter)
        }
    };

    let bind_address = config.bind_address();
    let state = AppState::new(Arc::new(PgStore::new(pool.clone())), ai, config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    close_pool(pool).await;
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutdown signal received, exiting...");
}
