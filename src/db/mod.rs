//! Persistence Module
//! Mission: Store voter credentials and the login audit trail in SQLite

pub mod voter_store;

pub use voter_store::VoterStore;
