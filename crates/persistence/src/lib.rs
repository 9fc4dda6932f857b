//! Session persistence
//!
//! The conversation engine persists a whole-row snapshot of each session
//! after every mutation. Storage is a trait so backends are pluggable:
//!
//! - [`InMemorySessionStore`] - default, sessions die with the process
//! - [`SqliteSessionStore`] - durable, one row per session
//!
//! The store is a collaborator, not a source of truth during a request:
//! writes that fail are logged by the caller and the request continues.

pub mod memory;
pub mod sqlite;

pub use memory::InMemorySessionStore;
pub use sqlite::SqliteSessionStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Persistence errors
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Corrupt session row for {id}: {message}")]
    Corrupt { id: String, message: String },
}

impl From<sqlx::Error> for PersistenceError {
    fn from(err: sqlx::Error) -> Self {
        PersistenceError::Database(err.to_string())
    }
}

/// One persisted session row
///
/// History, insights and actions are stored as JSON columns; the engine
/// serializes them on write and deserializes on recovery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: String,
    pub user_id: String,
    pub topic: Option<String>,
    pub current_stage: String,
    pub conversation_history: String,
    pub insights: String,
    pub actions: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Session store trait for pluggable backends
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Insert or replace the whole row for a session. Idempotent.
    async fn upsert(&self, record: &SessionRecord) -> Result<(), PersistenceError>;

    /// Load a session row by id
    async fn load(&self, id: &str) -> Result<Option<SessionRecord>, PersistenceError>;

    /// Delete a session row
    async fn delete(&self, id: &str) -> Result<(), PersistenceError>;

    /// List all persisted session ids
    async fn list_ids(&self) -> Result<Vec<String>, PersistenceError>;

    /// Whether rows survive a process restart
    fn is_durable(&self) -> bool;
}
