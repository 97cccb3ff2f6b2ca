//! Configuration
//! Mission: One explicit settings struct built from the environment at boot

use crate::auth::address::Address;
use anyhow::{Context, Result};
use std::env;

/// Process configuration, read once in `main` and shared read-only
/// through application state.
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_path: String,
    pub bind_addr: String,
    pub jwt_secret: String,
    pub jwt_refresh_secret: String,
    pub access_ttl_minutes: i64,
    pub refresh_ttl_days: i64,
    pub rpc_url: String,
    pub contract_address: Address,
    pub owner_address: Option<Address>,
    /// Opt-in development mode: contract failures on read endpoints fall
    /// back to canned data and writes report a simulated transaction.
    pub mock_fallback: bool,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        let jwt_secret = env::var("JWT_SECRET")
            .unwrap_or_else(|_| "dev-secret-change-in-production-minimum-32-characters".to_string());
        let jwt_refresh_secret =
            env::var("JWT_REFRESH_SECRET").unwrap_or_else(|_| format!("{}_refresh", jwt_secret));

        let access_ttl_minutes = env::var("ACCESS_TOKEN_EXPIRE_MINUTES")
            .unwrap_or_else(|_| "60".to_string())
            .parse::<i64>()
            .context("Invalid ACCESS_TOKEN_EXPIRE_MINUTES")?;
        let refresh_ttl_days = env::var("REFRESH_TOKEN_EXPIRE_DAYS")
            .unwrap_or_else(|_| "7".to_string())
            .parse::<i64>()
            .context("Invalid REFRESH_TOKEN_EXPIRE_DAYS")?;

        let contract_address = env::var("VOTING_CONTRACT_ADDRESS")
            .unwrap_or_else(|_| "0xd223C26a57c51364Cbb8728984EE22744fAe7840".to_string())
            .parse::<Address>()
            .context("Invalid VOTING_CONTRACT_ADDRESS")?;

        let owner_address = match env::var("OWNER_ADDRESS") {
            Ok(raw) if !raw.trim().is_empty() => Some(
                raw.parse::<Address>().context("Invalid OWNER_ADDRESS")?,
            ),
            _ => None,
        };

        let mock_fallback = env::var("CHAIN_MOCK_FALLBACK")
            .map(|v| matches!(v.as_str(), "1" | "true" | "TRUE" | "on" | "ON"))
            .unwrap_or(false);

        Ok(Self {
            database_path: env::var("DATABASE_PATH").unwrap_or_else(|_| "votechain.db".to_string()),
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".to_string()),
            jwt_secret,
            jwt_refresh_secret,
            access_ttl_minutes,
            refresh_ttl_days,
            rpc_url: env::var("ETH_RPC_URL").unwrap_or_else(|_| "http://127.0.0.1:7545".to_string()),
            contract_address,
            owner_address,
            mock_fallback,
        })
    }
}
