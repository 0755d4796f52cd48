mod auth;
mod career;
mod chat;
mod config;
mod db;
mod errors;
mod events;
mod interview;
mod llm_client;
mod memory;
mod mentor;
mod models;
mod profile;
mod routes;
mod state;
#[cfg(test)]
mod test_support;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::auth::SupabaseAuth;
use crate::config::Config;
use crate::db::create_pool;
use crate::llm_client::{ChatModel, LlmClient};
use crate::memory::PgMemoryStore;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={},tower_http={}",
                env!("CARGO_CRATE_NAME"),
                &config.rust_log,
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Mentor API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;
    let memory = Arc::new(PgMemoryStore::new(db.clone()));

    // Initialize LLM client
    let llm = LlmClient::new(&config)?;
    info!(
        "LLM client initialized (chat: {}, planning: {}, simulation: {})",
        llm.models().chat,
        llm.models().planning,
        llm.models().simulation
    );
    if !llm.is_configured() {
        warn!("No LLM API key set (LLM_API_KEY / GROQ_API_KEY); AI routes will fail until one is provided");
    }

    // Initialize token verification
    let auth = Arc::new(SupabaseAuth::new(&config)?);

    // Build app state
    let state = AppState {
        db,
        memory,
        llm: Arc::new(llm),
        auth,
    };

    // Build router
    let app = build_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()), // TODO: restrict origins once the web client's domain is fixed
    );

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
