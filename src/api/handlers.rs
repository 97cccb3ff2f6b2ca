//! Voting API Handlers
//! Mission: Health probes, voter status, and contract relay endpoints

use crate::api::error::ApiError;
use crate::api::routes::AppState;
use crate::auth::address::Address;
use crate::auth::models::{Claims, Role};
use crate::auth::tokens::{AuthError, Reason};
use crate::chain::Candidate;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Extension, Json};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

/// All-zero transaction hash reported when mock fallback simulates a
/// relay.
fn simulated_tx_hash() -> String {
    format!("0x{}", "0".repeat(64))
}

/// Canned candidate list served under mock fallback.
fn sample_candidates() -> Vec<Candidate> {
    vec![
        Candidate {
            id: 1,
            name: "Sample Candidate 1".to_string(),
            party: "Party A".to_string(),
            vote_count: 5,
        },
        Candidate {
            id: 2,
            name: "Sample Candidate 2".to_string(),
            party: "Party B".to_string(),
            vote_count: 3,
        },
    ]
}

fn claims_address(claims: &Claims) -> Result<Address, ApiError> {
    claims
        .voter_id
        .parse()
        .map_err(|_| ApiError::Auth(AuthError::Unauthenticated(Reason::InvalidToken)))
}

fn iso(timestamp: u64) -> Option<String> {
    if timestamp == 0 {
        return None;
    }
    DateTime::from_timestamp(timestamp as i64, 0).map(|d| d.to_rfc3339())
}

// ===== Health =====

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    version: String,
}

/// Health check endpoint
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Credential store connectivity probe
pub async fn health_db(State(state): State<AppState>) -> Result<Json<serde_json::Value>, ApiError> {
    state.store.ping()?;
    Ok(Json(json!({
        "status": "success",
        "message": "Database connection successful",
    })))
}

/// RPC node connectivity probe
pub async fn health_chain(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let block_number = state.chain.block_number().await?;
    Ok(Json(json!({
        "status": "success",
        "message": "Ethereum connection successful",
        "block_number": block_number,
    })))
}

// ===== Voter status =====

#[derive(Serialize)]
pub struct VoterStatusResponse {
    voter_id: String,
    has_voted: bool,
    voting_status: &'static str,
}

/// GET /voter/status (bearer)
pub async fn voter_status(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<VoterStatusResponse>, ApiError> {
    let address = claims_address(&claims)?;

    let has_voted = state.chain.has_voted(&address).await?;
    let status = state.chain.voting_status().await?;

    info!(
        "Voter status for {}: has_voted={}, status={}",
        claims.voter_id,
        has_voted,
        status.as_str()
    );

    Ok(Json(VoterStatusResponse {
        voter_id: claims.voter_id,
        has_voted,
        voting_status: status.as_str(),
    }))
}

// ===== Voting dates =====

#[derive(Serialize)]
pub struct VotingDatesResponse {
    start_date: u64,
    end_date: u64,
    start_date_iso: Option<String>,
    end_date_iso: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    note: Option<String>,
}

/// GET /voting/dates (public)
pub async fn voting_dates(
    State(state): State<AppState>,
) -> Result<Json<VotingDatesResponse>, ApiError> {
    match state.chain.voting_period().await {
        Ok((start, end)) => Ok(Json(VotingDatesResponse {
            start_date: start,
            end_date: end,
            start_date_iso: iso(start),
            end_date_iso: iso(end),
            note: None,
        })),
        Err(e) if state.settings.mock_fallback => {
            warn!("Contract error when fetching voting dates, serving defaults: {}", e);
            let now = Utc::now();
            let end = now + Duration::days(7);
            Ok(Json(VotingDatesResponse {
                start_date: now.timestamp() as u64,
                end_date: end.timestamp() as u64,
                start_date_iso: Some(now.to_rfc3339()),
                end_date_iso: Some(end.to_rfc3339()),
                note: Some(format!("These are default values. Contract error: {}", e)),
            }))
        }
        Err(e) => Err(e.into()),
    }
}

// ===== Candidates =====

/// GET /candidates (public)
pub async fn list_candidates(
    State(state): State<AppState>,
) -> Result<Json<Vec<Candidate>>, ApiError> {
    match state.chain.all_candidates().await {
        Ok(candidates) => {
            info!("Retrieved {} candidates", candidates.len());
            Ok(Json(candidates))
        }
        Err(e) if state.settings.mock_fallback => {
            warn!("Contract error when fetching candidates, serving sample data: {}", e);
            Ok(Json(sample_candidates()))
        }
        Err(e) => Err(e.into()),
    }
}

#[derive(Debug, Deserialize)]
pub struct CandidateCreate {
    pub name: String,
    pub party: String,
}

/// POST /candidates (bearer + admin)
pub async fn add_candidate(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CandidateCreate>,
) -> Result<impl IntoResponse, ApiError> {
    claims.require_role(Role::Admin)?;

    if payload.name.trim().is_empty() || payload.party.trim().is_empty() {
        return Err(ApiError::Validation(
            "Candidate name and party must be non-empty".to_string(),
        ));
    }

    info!(
        "Adding candidate: {} ({}) by admin: {}",
        payload.name, payload.party, claims.voter_id
    );

    match state.chain.add_candidate(&payload.name, &payload.party).await {
        Ok(tx_hash) => Ok((
            StatusCode::CREATED,
            Json(json!({ "transaction_hash": tx_hash, "message": "Candidate added" })),
        )),
        Err(e) if state.settings.mock_fallback => {
            warn!("Contract error when adding candidate, simulating: {}", e);
            Ok((
                StatusCode::CREATED,
                Json(json!({
                    "transaction_hash": simulated_tx_hash(),
                    "message": "Candidate addition simulated (contract error occurred)",
                })),
            ))
        }
        Err(e) => Err(e.into()),
    }
}

// ===== Voting =====

#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    pub candidate_id: u64,
}

/// POST /vote (bearer)
pub async fn submit_vote(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<VoteRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if payload.candidate_id == 0 {
        return Err(ApiError::Validation(
            "candidate_id must be greater than zero".to_string(),
        ));
    }

    let address = claims_address(&claims)?;
    info!(
        "Vote attempt from {} for candidate {}",
        claims.voter_id, payload.candidate_id
    );

    match state.chain.has_voted(&address).await {
        Ok(true) => {
            warn!("Vote failed: {} has already voted", claims.voter_id);
            return Err(ApiError::Conflict("Already voted"));
        }
        Ok(false) => {}
        Err(e) if state.settings.mock_fallback => {
            warn!("Contract error when checking vote status, proceeding: {}", e);
        }
        Err(e) => return Err(e.into()),
    }

    match state.chain.vote(payload.candidate_id, &address).await {
        Ok(tx_hash) => {
            info!("Vote recorded for {}, tx_hash: {}", claims.voter_id, tx_hash);
            Ok((
                StatusCode::CREATED,
                Json(json!({ "transaction_hash": tx_hash, "message": "Vote recorded" })),
            ))
        }
        Err(e) if state.settings.mock_fallback => {
            warn!("Contract error when submitting vote, simulating: {}", e);
            Ok((
                StatusCode::CREATED,
                Json(json!({
                    "transaction_hash": simulated_tx_hash(),
                    "message": "Vote simulated (contract error occurred)",
                })),
            ))
        }
        Err(e) => Err(e.into()),
    }
}

#[derive(Debug, Deserialize)]
pub struct VotingDatesRequest {
    pub start_date: u64,
    pub end_date: u64,
}

/// POST /voting/set-dates and /voting/update-dates (bearer + admin)
pub async fn set_voting_dates(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<VotingDatesRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    claims.require_role(Role::Admin)?;

    if payload.start_date == 0 {
        return Err(ApiError::Validation(
            "start_date must be greater than zero".to_string(),
        ));
    }
    if payload.end_date <= payload.start_date {
        return Err(ApiError::Validation(
            "End date must be after start date".to_string(),
        ));
    }

    info!(
        "Setting voting dates {} to {} by admin: {}",
        payload.start_date, payload.end_date, claims.voter_id
    );

    match state
        .chain
        .set_voting_period(payload.start_date, payload.end_date)
        .await
    {
        Ok(tx_hash) => Ok(Json(
            json!({ "transaction_hash": tx_hash, "message": "Voting dates set" }),
        )),
        Err(e) if state.settings.mock_fallback => {
            warn!("Contract error when setting voting dates, simulating: {}", e);
            Ok(Json(json!({
                "transaction_hash": simulated_tx_hash(),
                "message": "Voting dates setting simulated (contract error occurred)",
            })))
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulated_tx_hash_shape() {
        let hash = simulated_tx_hash();
        assert_eq!(hash.len(), 66);
        assert!(hash.starts_with("0x"));
        assert!(hash[2..].chars().all(|c| c == '0'));
    }

    #[test]
    fn test_sample_candidates_are_stable() {
        let candidates = sample_candidates();
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].id, 1);
        assert_eq!(candidates[1].party, "Party B");
    }

    #[test]
    fn test_iso_rendering() {
        assert!(iso(0).is_none());
        let rendered = iso(1_700_000_000).unwrap();
        assert!(rendered.starts_with("2023-11-14T"));
    }

    #[test]
    fn test_claims_address_requires_parseable_voter_id() {
        let good = Claims {
            voter_id: "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed".to_string(),
            role: Role::Voter,
            exp: 4102444800,
        };
        assert!(claims_address(&good).is_ok());

        let bad = Claims {
            voter_id: "alice".to_string(),
            ..good
        };
        assert!(claims_address(&bad).is_err());
    }
}
