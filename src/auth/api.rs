//! Authentication API Endpoints
//! Mission: Registration, login, token refresh, and logout

use crate::api::error::ApiError;
use crate::api::routes::AppState;
use crate::auth::address::Address;
use crate::auth::models::{
    Claims, LoginRequest, LoginResponse, RefreshRequest, RefreshResponse, RegisterRequest, Role,
};
use crate::auth::password::{hash_password, verify_password};
use crate::auth::tokens::{AuthError, Reason};
use axum::{extract::State, http::StatusCode, response::IntoResponse, Extension, Json};
use serde_json::json;
use tracing::{info, warn};

fn parse_address(raw: &str) -> Result<Address, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::Validation("Invalid Ethereum address format".to_string()))
}

fn parse_role(raw: Option<&str>) -> Result<Role, ApiError> {
    match raw {
        None => Ok(Role::Voter),
        Some(s) => Role::from_str(s).ok_or_else(|| {
            ApiError::Validation("Role must be either \"voter\" or \"admin\"".to_string())
        }),
    }
}

/// Register a new voter - POST /register
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    info!("Registration attempt for voter_id: {}", payload.voter_id);

    let address = parse_address(&payload.voter_id)?;
    let role = parse_role(payload.role.as_deref())?;
    if payload.password.len() < 6 {
        return Err(ApiError::Validation(
            "Password must be at least 6 characters".to_string(),
        ));
    }

    let voter_id = address.to_string();
    let password_hash = hash_password(&payload.password)?;

    let created = state.store.create_voter(&voter_id, &password_hash, role)?;
    if !created {
        warn!("Registration failed: Voter ID already exists - {}", voter_id);
        return Err(ApiError::Conflict("Voter ID already exists"));
    }

    info!(
        "Registration successful for voter_id: {}, role: {}",
        voter_id,
        role.as_str()
    );

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Voter registered successfully" })),
    ))
}

/// Login - POST /login
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    info!("Login attempt for voter_id: {}", payload.voter_id);

    let address = parse_address(&payload.voter_id)?;
    let voter_id = address.to_string();

    // Missing record and wrong password take the same path: the 401 must
    // not reveal whether the account exists.
    let voter = match state.store.get_voter(&voter_id)? {
        Some(v) if verify_password(&payload.password, &v.password_hash) => v,
        _ => {
            warn!("Login failed for voter_id: {}", voter_id);
            return Err(ApiError::InvalidCredentials);
        }
    };

    let token = state.tokens.issue_access(&voter_id, voter.role)?;
    let refresh_token = state.tokens.issue_refresh(&voter_id, voter.role)?;

    // A history-write fault never blocks a successful login.
    if let Err(e) = state.store.append_login(&voter_id, true) {
        warn!("Failed to record login history: {:#}", e);
    }

    info!(
        "Login successful for voter_id: {}, role: {}",
        voter_id,
        voter.role.as_str()
    );

    Ok(Json(LoginResponse {
        token,
        refresh_token,
        role: voter.role,
    }))
}

/// Exchange a refresh token for a fresh token pair - POST /refresh
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<RefreshResponse>, ApiError> {
    info!("Token refresh attempt");

    let claims = state.tokens.validate_refresh(&payload.refresh_token)?;

    // The embedded role must still match the stored role; a demoted or
    // deleted voter cannot mint tokens from an old grant.
    match state.store.get_voter(&claims.voter_id)? {
        Some(voter) if voter.role == claims.role => {}
        _ => {
            warn!(
                "Token refresh failed: stale or unknown voter_id - {}",
                claims.voter_id
            );
            return Err(ApiError::Auth(AuthError::Unauthenticated(
                Reason::InvalidToken,
            )));
        }
    }

    let token = state.tokens.issue_access(&claims.voter_id, claims.role)?;
    let refresh_token = state.tokens.issue_refresh(&claims.voter_id, claims.role)?;

    info!("Token refresh successful for voter_id: {}", claims.voter_id);

    Ok(Json(RefreshResponse {
        token,
        refresh_token,
    }))
}

/// Logout - POST /logout
///
/// Tokens are stateless and stay valid until expiry; logout only appends
/// an audit record, and a failure to write it surfaces as 500.
pub async fn logout(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.store.append_login(&claims.voter_id, false)?;

    info!("Logout recorded for voter_id: {}", claims.voter_id);

    Ok(Json(json!({ "message": "Logged out successfully" })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_role_defaults_to_voter() {
        assert_eq!(parse_role(None).unwrap(), Role::Voter);
        assert_eq!(parse_role(Some("admin")).unwrap(), Role::Admin);
        assert_eq!(parse_role(Some("voter")).unwrap(), Role::Voter);
        assert!(parse_role(Some("superuser")).is_err());
    }

    #[test]
    fn test_parse_address_rejects_garbage() {
        assert!(parse_address("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed").is_ok());
        assert!(parse_address("not-an-address").is_err());
    }
}
