//! Blockchain Relay Module
//! Mission: Relay vote/candidate operations to the deployed voting contract

pub mod abi;
pub mod client;

pub use client::{Candidate, ChainClient, ContractError, VotingStatus};
