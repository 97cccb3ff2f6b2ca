//! Router Assembly
//! Mission: Wire public, bearer-protected, and admin endpoints

use crate::api::handlers;
use crate::auth::{api as auth_api, auth_middleware, TokenKeys};
use crate::chain::ChainClient;
use crate::config::Settings;
use crate::db::VoterStore;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Shared application state. Everything here is read-only after boot, so
/// request handling needs no locking.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub store: Arc<VoterStore>,
    pub tokens: Arc<TokenKeys>,
    pub chain: Arc<ChainClient>,
}

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    let keys = state.tokens.clone();

    let public = Router::new()
        .route("/health", get(handlers::health))
        .route("/health/db", get(handlers::health_db))
        .route("/health/chain", get(handlers::health_chain))
        .route("/register", post(auth_api::register))
        .route("/login", post(auth_api::login))
        .route("/refresh", post(auth_api::refresh))
        .route("/voting/dates", get(handlers::voting_dates))
        .route("/candidates", get(handlers::list_candidates));

    // Admin-only handlers additionally check the role claim themselves.
    let protected = Router::new()
        .route("/logout", post(auth_api::logout))
        .route("/voter/status", get(handlers::voter_status))
        .route("/vote", post(handlers::submit_vote))
        .route("/candidates", post(handlers::add_candidate))
        .route("/voting/set-dates", post(handlers::set_voting_dates))
        .route("/voting/update-dates", post(handlers::set_voting_dates))
        .route_layer(middleware::from_fn_with_state(keys, auth_middleware));

    Router::new().merge(public).merge(protected).with_state(state)
}
