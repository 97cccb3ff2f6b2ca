//! Authentication Models
//! Mission: Define secure voter and authentication data structures

use crate::auth::tokens::AuthError;
use serde::{Deserialize, Serialize};

/// Voter account as stored in the credential store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Voter {
    pub voter_id: String, // checksummed Ethereum address
    #[serde(skip_serializing)]
    pub password_hash: String, // bcrypt hash - never serialize
    pub role: Role,
    pub created_at: String,
}

/// Voter roles for RBAC
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Role {
    #[serde(rename = "voter")]
    Voter, // May cast a vote and inspect their own status
    #[serde(rename = "admin")]
    Admin, // May manage candidates and the voting period
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::Voter => "voter",
            Role::Admin => "admin",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "voter" => Some(Role::Voter),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

/// JWT Claims payload, shared by access and refresh tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub voter_id: String, // checksummed address
    pub role: Role,
    pub exp: usize, // expiration timestamp
}

impl Claims {
    /// Binary role equality: admin does not satisfy a voter check and
    /// vice versa.
    pub fn require_role(&self, required: Role) -> Result<(), AuthError> {
        if self.role == required {
            Ok(())
        } else {
            Err(AuthError::Forbidden)
        }
    }
}

/// Registration request body
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub voter_id: String,
    pub password: String,
    #[serde(default)]
    pub role: Option<String>,
}

/// Login request body
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub voter_id: String,
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub refresh_token: String,
    pub role: Role,
}

/// Refresh request body
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Refresh response
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub token: String,
    pub refresh_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serialization() {
        let admin = Role::Admin;
        let json = serde_json::to_string(&admin).unwrap();
        assert_eq!(json, r#""admin""#);

        let voter: Role = serde_json::from_str(r#""voter""#).unwrap();
        assert_eq!(voter, Role::Voter);
    }

    #[test]
    fn test_role_string_conversion() {
        assert_eq!(Role::Admin.as_str(), "admin");
        assert_eq!(Role::Voter.as_str(), "voter");

        assert_eq!(Role::from_str("admin"), Some(Role::Admin));
        assert_eq!(Role::from_str("VOTER"), Some(Role::Voter));
        assert_eq!(Role::from_str("observer"), None);
    }

    #[test]
    fn test_require_role_is_exact_in_both_directions() {
        let voter = Claims {
            voter_id: "0x0000000000000000000000000000000000000001".to_string(),
            role: Role::Voter,
            exp: 4102444800,
        };
        let admin = Claims {
            role: Role::Admin,
            ..voter.clone()
        };

        assert!(voter.require_role(Role::Voter).is_ok());
        assert!(admin.require_role(Role::Admin).is_ok());
        assert_eq!(voter.require_role(Role::Admin), Err(AuthError::Forbidden));
        assert_eq!(admin.require_role(Role::Voter), Err(AuthError::Forbidden));
    }

    #[test]
    fn test_register_request_role_defaults_to_absent() {
        let req: RegisterRequest =
            serde_json::from_str(r#"{"voter_id": "0xabc", "password": "secret1"}"#).unwrap();
        assert!(req.role.is_none());
    }
}
