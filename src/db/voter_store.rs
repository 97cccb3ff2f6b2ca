//! Voter Storage
//! Mission: Securely store voter credentials and login history with SQLite

use crate::auth::models::{Role, Voter};
use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::info;

/// Credential store with a SQLite backend. Connections are opened per
/// operation and released on every exit path; the single insert/select
/// round-trips rely on SQLite's own transaction facility for atomicity.
pub struct VoterStore {
    db_path: String,
}

impl VoterStore {
    /// Create a new store and initialize the schema.
    pub fn new(db_path: &str) -> Result<Self> {
        let store = Self {
            db_path: db_path.to_string(),
        };
        store.init_db()?;
        Ok(store)
    }

    fn open(&self) -> Result<Connection> {
        Connection::open(&self.db_path).context("Failed to open voter database")
    }

    fn init_db(&self) -> Result<()> {
        let conn = self.open()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS voters (
                voter_id TEXT PRIMARY KEY,
                password_hash TEXT NOT NULL,
                role TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS login_history (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                voter_id TEXT NOT NULL,
                login_time TEXT NOT NULL,
                success INTEGER NOT NULL
            )",
            [],
        )?;

        Ok(())
    }

    /// Insert a new voter. Returns `false` when the id is already
    /// registered. The existence check and the insert run inside one
    /// transaction.
    ///
    /// `voter_id` must already be in canonical checksummed form.
    pub fn create_voter(&self, voter_id: &str, password_hash: &str, role: Role) -> Result<bool> {
        let mut conn = self.open()?;
        let tx = conn.transaction()?;

        let exists: Option<i64> = tx
            .query_row(
                "SELECT 1 FROM voters WHERE voter_id = ?1",
                params![voter_id],
                |row| row.get(0),
            )
            .optional()?;

        if exists.is_some() {
            return Ok(false);
        }

        tx.execute(
            "INSERT INTO voters (voter_id, password_hash, role, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                voter_id,
                password_hash,
                role.as_str(),
                Utc::now().to_rfc3339(),
            ],
        )
        .context("Failed to insert voter")?;

        tx.commit().context("Failed to commit registration")?;

        info!("Registered voter {} ({})", voter_id, role.as_str());

        Ok(true)
    }

    /// Look up a voter by canonical checksummed id.
    pub fn get_voter(&self, voter_id: &str) -> Result<Option<Voter>> {
        let conn = self.open()?;

        let mut stmt = conn.prepare(
            "SELECT voter_id, password_hash, role, created_at
             FROM voters WHERE voter_id = ?1",
        )?;

        let voter = stmt
            .query_row(params![voter_id], |row| {
                let role_str: String = row.get(2)?;
                Ok(Voter {
                    voter_id: row.get(0)?,
                    password_hash: row.get(1)?,
                    role: Role::from_str(&role_str).unwrap_or(Role::Voter),
                    created_at: row.get(3)?,
                })
            })
            .optional()?;

        Ok(voter)
    }

    /// Append a login-history entry. The table is append-only; rows are
    /// never updated or deleted.
    pub fn append_login(&self, voter_id: &str, success: bool) -> Result<()> {
        let conn = self.open()?;

        conn.execute(
            "INSERT INTO login_history (voter_id, login_time, success)
             VALUES (?1, ?2, ?3)",
            params![voter_id, Utc::now().to_rfc3339(), success],
        )
        .context("Failed to record login history")?;

        Ok(())
    }

    /// Connectivity probe for the health endpoint.
    pub fn ping(&self) -> Result<()> {
        let conn = self.open()?;
        conn.query_row("SELECT 1", [], |_| Ok(()))
            .context("Database ping failed")?;
        Ok(())
    }
}
