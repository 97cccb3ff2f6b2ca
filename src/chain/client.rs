//! Voting Contract Client
//! Mission: Typed JSON-RPC round-trips to the deployed voting contract

use crate::auth::address::Address;
use crate::chain::abi::{self, Token};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use tracing::debug;

/// Gas limit for relayed transactions (200_000, matching the contract's
/// deployment profile).
const TX_GAS: &str = "0x30d40";

/// Failure of a contract call. The caller decides the fallback policy;
/// nothing is swallowed here.
#[derive(Debug)]
pub enum ContractError {
    /// HTTP-level failure reaching the RPC endpoint.
    Transport(String),
    /// The node answered with a JSON-RPC error object.
    Node { code: i64, message: String },
    /// The node answered but the payload did not decode.
    Decode(String),
    /// A required setting (e.g. owner address) is absent.
    NotConfigured(&'static str),
}

impl fmt::Display for ContractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContractError::Transport(msg) => write!(f, "RPC transport error: {}", msg),
            ContractError::Node { code, message } => {
                write!(f, "Node error {}: {}", code, message)
            }
            ContractError::Decode(msg) => write!(f, "Malformed contract response: {}", msg),
            ContractError::NotConfigured(what) => write!(f, "Missing configuration: {}", what),
        }
    }
}

impl std::error::Error for ContractError {}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    pub code: Option<i64>,
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    pub result: Option<serde_json::Value>,
    pub error: Option<RpcErrorObject>,
}

/// A candidate row as stored by the contract.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub id: u64,
    pub name: String,
    pub party: String,
    pub vote_count: u64,
}

/// Contract voting phase, decoded from `getVotingStatus()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VotingStatus {
    NotStarted,
    Active,
    Ended,
    Unknown,
}

impl VotingStatus {
    pub fn from_code(code: u64) -> Self {
        match code {
            0 => VotingStatus::NotStarted,
            1 => VotingStatus::Active,
            2 => VotingStatus::Ended,
            _ => VotingStatus::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VotingStatus::NotStarted => "not_started",
            VotingStatus::Active => "active",
            VotingStatus::Ended => "ended",
            VotingStatus::Unknown => "unknown",
        }
    }
}

/// Client for the deployed voting contract. Reads go through `eth_call`;
/// writes are relayed as `eth_sendTransaction` from the node-managed
/// owner account.
pub struct ChainClient {
    http: reqwest::Client,
    rpc_url: String,
    contract: Address,
    owner: Option<Address>,
}

impl ChainClient {
    pub fn new(
        http: reqwest::Client,
        rpc_url: String,
        contract: Address,
        owner: Option<Address>,
    ) -> Self {
        Self {
            http,
            rpc_url,
            contract,
            owner,
        }
    }

    async fn rpc(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, ContractError> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        debug!("RPC {} -> {}", method, self.rpc_url);

        let resp = self
            .http
            .post(&self.rpc_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ContractError::Transport(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(ContractError::Transport(format!(
                "RPC endpoint returned HTTP {}",
                resp.status()
            )));
        }

        let rpc: RpcResponse = resp
            .json()
            .await
            .map_err(|e| ContractError::Transport(e.to_string()))?;

        if let Some(err) = rpc.error {
            return Err(ContractError::Node {
                code: err.code.unwrap_or(0),
                message: err.message.unwrap_or_else(|| "unknown node error".to_string()),
            });
        }

        rpc.result
            .ok_or_else(|| ContractError::Decode("RPC response missing result".to_string()))
    }

    async fn call(&self, data: String) -> Result<Vec<u8>, ContractError> {
        let result = self
            .rpc(
                "eth_call",
                json!([
                    { "to": self.contract.to_string(), "data": data },
                    "latest"
                ]),
            )
            .await?;

        let hex_str = result
            .as_str()
            .ok_or_else(|| ContractError::Decode("eth_call result is not a string".to_string()))?;

        abi::strip_result(hex_str).map_err(|e| ContractError::Decode(e.to_string()))
    }

    async fn send(
        &self,
        data: String,
        fallback_from: Option<&Address>,
    ) -> Result<String, ContractError> {
        let from = self
            .owner
            .as_ref()
            .or(fallback_from)
            .ok_or(ContractError::NotConfigured("owner address"))?;

        let result = self
            .rpc(
                "eth_sendTransaction",
                json!([{
                    "from": from.to_string(),
                    "to": self.contract.to_string(),
                    "gas": TX_GAS,
                    "data": data,
                }]),
            )
            .await?;

        result
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| ContractError::Decode("Transaction hash is not a string".to_string()))
    }

    /// Node reachability probe for the health endpoint.
    pub async fn block_number(&self) -> Result<u64, ContractError> {
        let result = self.rpc("eth_blockNumber", json!([])).await?;
        let hex_str = result.as_str().ok_or_else(|| {
            ContractError::Decode("eth_blockNumber result is not a string".to_string())
        })?;
        u64::from_str_radix(hex_str.trim_start_matches("0x"), 16)
            .map_err(|e| ContractError::Decode(e.to_string()))
    }

    pub async fn has_voted(&self, voter: &Address) -> Result<bool, ContractError> {
        let data = abi::encode_call("hasVoted(address)", &[Token::Address(*voter.as_bytes())]);
        let out = self.call(data).await?;
        abi::decode_bool(&out).map_err(|e| ContractError::Decode(e.to_string()))
    }

    pub async fn voting_status(&self) -> Result<VotingStatus, ContractError> {
        let data = abi::encode_call("getVotingStatus()", &[]);
        let out = self.call(data).await?;
        let code = abi::decode_u64(&out).map_err(|e| ContractError::Decode(e.to_string()))?;
        Ok(VotingStatus::from_code(code))
    }

    /// Unix timestamps for the start and end of the voting period.
    pub async fn voting_period(&self) -> Result<(u64, u64), ContractError> {
        let data = abi::encode_call("getVotingPeriod()", &[]);
        let out = self.call(data).await?;
        abi::decode_u64_pair(&out).map_err(|e| ContractError::Decode(e.to_string()))
    }

    pub async fn all_candidates(&self) -> Result<Vec<Candidate>, ContractError> {
        let data = abi::encode_call("getAllCandidates()", &[]);
        let out = self.call(data).await?;
        let rows = abi::decode_candidates(&out).map_err(|e| ContractError::Decode(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|(id, name, party, vote_count)| Candidate {
                id,
                name,
                party,
                vote_count,
            })
            .collect())
    }

    /// Relay a vote. The authenticated voter's address is the sender of
    /// last resort when no owner account is configured.
    pub async fn vote(&self, candidate_id: u64, voter: &Address) -> Result<String, ContractError> {
        let data = abi::encode_call("vote(uint256)", &[Token::Uint(candidate_id)]);
        self.send(data, Some(voter)).await
    }

    pub async fn add_candidate(&self, name: &str, party: &str) -> Result<String, ContractError> {
        let data = abi::encode_call(
            "addCandidate(string,string)",
            &[Token::Str(name.to_string()), Token::Str(party.to_string())],
        );
        self.send(data, None).await
    }

    pub async fn set_voting_period(&self, start: u64, end: u64) -> Result<String, ContractError> {
        let data = abi::encode_call(
            "setVotingPeriod(uint256,uint256)",
            &[Token::Uint(start), Token::Uint(end)],
        );
        self.send(data, None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_voting_status_codes() {
        assert_eq!(VotingStatus::from_code(0), VotingStatus::NotStarted);
        assert_eq!(VotingStatus::from_code(1), VotingStatus::Active);
        assert_eq!(VotingStatus::from_code(2), VotingStatus::Ended);
        assert_eq!(VotingStatus::from_code(7), VotingStatus::Unknown);
        assert_eq!(VotingStatus::Active.as_str(), "active");
        assert_eq!(VotingStatus::NotStarted.as_str(), "not_started");
    }

    #[test]
    fn test_rpc_error_envelope_parses() {
        let raw = r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32000,"message":"revert"}}"#;
        let rpc: RpcResponse = serde_json::from_str(raw).unwrap();
        assert!(rpc.result.is_none());
        let err = rpc.error.unwrap();
        assert_eq!(err.code, Some(-32000));
        assert_eq!(err.message.as_deref(), Some("revert"));
    }

    #[test]
    fn test_rpc_result_envelope_parses() {
        let raw = r#"{"jsonrpc":"2.0","id":1,"result":"0x1"}"#;
        let rpc: RpcResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(rpc.result.unwrap().as_str(), Some("0x1"));
        assert!(rpc.error.is_none());
    }

    #[test]
    fn test_contract_error_display() {
        let err = ContractError::Node {
            code: -32000,
            message: "revert".to_string(),
        };
        assert_eq!(err.to_string(), "Node error -32000: revert");

        let err = ContractError::NotConfigured("owner address");
        assert_eq!(err.to_string(), "Missing configuration: owner address");
    }
}
