//! Token Issuer/Validator
//! Mission: Issue and validate access/refresh JWTs with independent secrets

use crate::auth::models::{Claims, Role};
use anyhow::{Context, Result};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde_json::json;
use tracing::debug;

/// Why a token was rejected. Serialized into 401 bodies so clients can
/// distinguish a missing header from a stale credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reason {
    NoToken,
    InvalidToken,
    ExpiredToken,
}

impl Reason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Reason::NoToken => "no_token",
            Reason::InvalidToken => "invalid_token",
            Reason::ExpiredToken => "expired_token",
        }
    }

    fn message(&self) -> &'static str {
        match self {
            Reason::NoToken => "No token provided",
            Reason::InvalidToken => "Invalid token",
            Reason::ExpiredToken => "Token expired",
        }
    }
}

/// Auth failure surfaced to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    Unauthenticated(Reason),
    Forbidden,
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::Unauthenticated(reason) => write!(f, "{}", reason.message()),
            AuthError::Forbidden => write!(f, "Admin rights required"),
        }
    }
}

impl std::error::Error for AuthError {}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            AuthError::Unauthenticated(reason) => (
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "error": reason.message(),
                    "reason": reason.as_str(),
                })),
            )
                .into_response(),
            AuthError::Forbidden => (
                StatusCode::FORBIDDEN,
                Json(json!({ "error": "Admin rights required" })),
            )
                .into_response(),
        }
    }
}

/// Issuer and validator for both token types. The access and refresh
/// secrets are independent, so a token of one type never validates as
/// the other.
pub struct TokenKeys {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenKeys {
    pub fn new(
        access_secret: &str,
        refresh_secret: &str,
        access_ttl_minutes: i64,
        refresh_ttl_days: i64,
    ) -> Self {
        Self {
            access_encoding: EncodingKey::from_secret(access_secret.as_bytes()),
            access_decoding: DecodingKey::from_secret(access_secret.as_bytes()),
            refresh_encoding: EncodingKey::from_secret(refresh_secret.as_bytes()),
            refresh_decoding: DecodingKey::from_secret(refresh_secret.as_bytes()),
            access_ttl: Duration::minutes(access_ttl_minutes),
            refresh_ttl: Duration::days(refresh_ttl_days),
        }
    }

    pub fn issue_access(&self, voter_id: &str, role: Role) -> Result<String> {
        self.issue(&self.access_encoding, self.access_ttl, voter_id, role)
    }

    pub fn issue_refresh(&self, voter_id: &str, role: Role) -> Result<String> {
        self.issue(&self.refresh_encoding, self.refresh_ttl, voter_id, role)
    }

    fn issue(&self, key: &EncodingKey, ttl: Duration, voter_id: &str, role: Role) -> Result<String> {
        let expiration = Utc::now()
            .checked_add_signed(ttl)
            .context("Invalid timestamp")?
            .timestamp() as usize;

        let claims = Claims {
            voter_id: voter_id.to_string(),
            role,
            exp: expiration,
        };

        debug!(
            "Issuing JWT for voter {} ({}), exp {}",
            voter_id,
            role.as_str(),
            expiration
        );

        encode(&Header::default(), &claims, key).context("Failed to generate JWT")
    }

    pub fn validate_access(&self, token: &str) -> Result<Claims, AuthError> {
        Self::validate(&self.access_decoding, token)
    }

    pub fn validate_refresh(&self, token: &str) -> Result<Claims, AuthError> {
        Self::validate(&self.refresh_decoding, token)
    }

    fn validate(key: &DecodingKey, token: &str) -> Result<Claims, AuthError> {
        if token.is_empty() {
            return Err(AuthError::Unauthenticated(Reason::NoToken));
        }

        let decoded =
            decode::<Claims>(token, key, &Validation::default()).map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Unauthenticated(Reason::ExpiredToken),
                _ => AuthError::Unauthenticated(Reason::InvalidToken),
            })?;

        let claims = decoded.claims;

        // Second explicit expiry compare, independent of the decoder's
        // own check (which allows clock leeway).
        if claims.exp as i64 <= Utc::now().timestamp() {
            return Err(AuthError::Unauthenticated(Reason::ExpiredToken));
        }

        debug!("Validated JWT for voter {}", claims.voter_id);

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VOTER: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";

    fn keys() -> TokenKeys {
        TokenKeys::new("test-access-secret", "test-refresh-secret", 60, 7)
    }

    #[test]
    fn test_access_token_roundtrip() {
        let keys = keys();
        let token = keys.issue_access(VOTER, Role::Voter).unwrap();

        let claims = keys.validate_access(&token).unwrap();
        assert_eq!(claims.voter_id, VOTER);
        assert_eq!(claims.role, Role::Voter);
        assert!(claims.exp > Utc::now().timestamp() as usize);
    }

    #[test]
    fn test_refresh_token_roundtrip() {
        let keys = keys();
        let token = keys.issue_refresh(VOTER, Role::Admin).unwrap();

        let claims = keys.validate_refresh(&token).unwrap();
        assert_eq!(claims.role, Role::Admin);
    }

    #[test]
    fn test_token_types_do_not_cross_validate() {
        let keys = keys();

        let access = keys.issue_access(VOTER, Role::Voter).unwrap();
        assert_eq!(
            keys.validate_refresh(&access),
            Err(AuthError::Unauthenticated(Reason::InvalidToken))
        );

        let refresh = keys.issue_refresh(VOTER, Role::Voter).unwrap();
        assert_eq!(
            keys.validate_access(&refresh),
            Err(AuthError::Unauthenticated(Reason::InvalidToken))
        );
    }

    #[test]
    fn test_garbage_and_missing_tokens_rejected() {
        let keys = keys();

        assert_eq!(
            keys.validate_access(""),
            Err(AuthError::Unauthenticated(Reason::NoToken))
        );
        assert_eq!(
            keys.validate_access("invalid.token.here"),
            Err(AuthError::Unauthenticated(Reason::InvalidToken))
        );
    }

    #[test]
    fn test_tampered_token_rejected() {
        let keys = keys();
        let mut token = keys.issue_access(VOTER, Role::Voter).unwrap();
        token.push('A');

        assert_eq!(
            keys.validate_access(&token),
            Err(AuthError::Unauthenticated(Reason::InvalidToken))
        );
    }

    #[test]
    fn test_different_secrets_reject() {
        let keys1 = TokenKeys::new("secret1", "refresh1", 60, 7);
        let keys2 = TokenKeys::new("secret2", "refresh2", 60, 7);

        let token = keys1.issue_access(VOTER, Role::Voter).unwrap();
        assert!(keys2.validate_access(&token).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        // Negative TTL puts the expiry in the past. The decoder's leeway
        // may still accept it, which is exactly what the second explicit
        // compare exists to catch.
        let keys = TokenKeys::new("test-access-secret", "test-refresh-secret", -1, 7);
        let token = keys.issue_access(VOTER, Role::Voter).unwrap();

        assert_eq!(
            keys.validate_access(&token),
            Err(AuthError::Unauthenticated(Reason::ExpiredToken))
        );
    }
}
