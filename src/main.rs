//! Votechain Backend Server
//!
//! Authenticates voters, persists credentials in SQLite, and relays
//! vote/candidate operations to the deployed voting contract.

use anyhow::{Context, Result};
use axum::middleware;
use dotenv::dotenv;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use votechain_backend::api::{create_router, AppState};
use votechain_backend::auth::TokenKeys;
use votechain_backend::chain::ChainClient;
use votechain_backend::config::Settings;
use votechain_backend::db::VoterStore;
use votechain_backend::middleware::request_logging;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize environment and logging
    dotenv().ok();
    init_tracing();

    info!("🗳️  Votechain backend starting");

    let settings = Arc::new(Settings::from_env()?);

    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()
        .context("Failed to build HTTP client")?;

    let store = Arc::new(VoterStore::new(&settings.database_path)?);
    info!("📊 Credential store initialized at: {}", settings.database_path);

    let tokens = Arc::new(TokenKeys::new(
        &settings.jwt_secret,
        &settings.jwt_refresh_secret,
        settings.access_ttl_minutes,
        settings.refresh_ttl_days,
    ));

    let chain = Arc::new(ChainClient::new(
        http_client,
        settings.rpc_url.clone(),
        settings.contract_address,
        settings.owner_address,
    ));
    info!(
        "⛓️  Voting contract {} via {}",
        settings.contract_address, settings.rpc_url
    );
    if settings.mock_fallback {
        info!("⚠️  Mock fallback enabled: contract errors degrade to simulated data");
    }

    let state = AppState {
        settings: settings.clone(),
        store,
        tokens,
        chain,
    };

    // CatchPanicLayer is outermost so no fault escapes without a 500.
    let app = create_router(state).layer(
        ServiceBuilder::new()
            .layer(CatchPanicLayer::new())
            .layer(CorsLayer::permissive())
            .layer(middleware::from_fn(request_logging)),
    );

    let listener = TcpListener::bind(&settings.bind_addr).await?;
    info!("🎯 API server listening on {}", settings.bind_addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

/// Initialize tracing with env-filter overrides
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "votechain_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
