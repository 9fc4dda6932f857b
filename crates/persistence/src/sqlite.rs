//! SQLite session store
//!
//! One row per session. Timestamps are stored as RFC 3339 text so the
//! schema stays portable; JSON columns hold the serialized history,
//! insights and actions.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;

use crate::{PersistenceError, SessionRecord, SessionStore};

const CREATE_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS sessions (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        topic TEXT,
        current_stage TEXT NOT NULL,
        conversation_history TEXT NOT NULL,
        insights TEXT NOT NULL,
        actions TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
";

/// Durable session store backed by SQLite
pub struct SqliteSessionStore {
    pool: SqlitePool,
}

impl SqliteSessionStore {
    /// Open (creating if missing) the database at `path` and ensure the schema
    pub async fn open(path: &str) -> Result<Self, PersistenceError> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await?;

        sqlx::query(CREATE_TABLE).execute(&pool).await?;

        tracing::info!(path = %path, "SQLite session store ready");
        Ok(Self { pool })
    }

    fn row_to_record(row: &sqlx::sqlite::SqliteRow) -> Result<SessionRecord, PersistenceError> {
        let id: String = row.get("id");

        let parse_ts = |column: &str| -> Result<DateTime<Utc>, PersistenceError> {
            let raw: String = row.get(column);
            DateTime::parse_from_rfc3339(&raw)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| PersistenceError::Corrupt {
                    id: id.clone(),
                    message: format!("bad {column} timestamp: {e}"),
                })
        };

        Ok(SessionRecord {
            user_id: row.get("user_id"),
            topic: row.get("topic"),
            current_stage: row.get("current_stage"),
            conversation_history: row.get("conversation_history"),
            insights: row.get("insights"),
            actions: row.get("actions"),
            created_at: parse_ts("created_at")?,
            updated_at: parse_ts("updated_at")?,
            id,
        })
    }
}

#[async_trait]
impl SessionStore for SqliteSessionStore {
    async fn upsert(&self, record: &SessionRecord) -> Result<(), PersistenceError> {
        sqlx::query(
            "INSERT INTO sessions \
                 (id, user_id, topic, current_stage, conversation_history, \
                  insights, actions, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9) \
             ON CONFLICT(id) DO UPDATE SET \
                 user_id = excluded.user_id, \
                 topic = excluded.topic, \
                 current_stage = excluded.current_stage, \
                 conversation_history = excluded.conversation_history, \
                 insights = excluded.insights, \
                 actions = excluded.actions, \
                 updated_at = excluded.updated_at",
        )
        .bind(&record.id)
        .bind(&record.user_id)
        .bind(&record.topic)
        .bind(&record.current_stage)
        .bind(&record.conversation_history)
        .bind(&record.insights)
        .bind(&record.actions)
        .bind(record.created_at.to_rfc3339())
        .bind(record.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        tracing::debug!(session_id = %record.id, stage = %record.current_stage, "Session persisted");
        Ok(())
    }

    async fn load(&self, id: &str) -> Result<Option<SessionRecord>, PersistenceError> {
        let row = sqlx::query("SELECT * FROM sessions WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| Self::row_to_record(&r)).transpose()
    }

    async fn delete(&self, id: &str) -> Result<(), PersistenceError> {
        sqlx::query("DELETE FROM sessions WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_ids(&self) -> Result<Vec<String>, PersistenceError> {
        let rows = sqlx::query("SELECT id FROM sessions")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(|r| r.get("id")).collect())
    }

    fn is_durable(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record(id: &str) -> SessionRecord {
        SessionRecord {
            id: id.to_string(),
            user_id: "user-1".to_string(),
            topic: None,
            current_stage: "intake".to_string(),
            conversation_history: r#"[{"role":"user","content":"hi"}]"#.to_string(),
            insights: "[]".to_string(),
            actions: "[]".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    async fn temp_store() -> (tempfile::TempDir, SqliteSessionStore) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sessions.db");
        let store = SqliteSessionStore::open(path.to_str().unwrap())
            .await
            .unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn test_round_trip() {
        let (_dir, store) = temp_store().await;
        let record = sample_record("s1");

        store.upsert(&record).await.unwrap();
        let loaded = store.load("s1").await.unwrap().unwrap();

        assert_eq!(loaded.id, record.id);
        assert_eq!(loaded.conversation_history, record.conversation_history);
        // RFC 3339 keeps sub-second precision, so timestamps survive intact
        assert_eq!(loaded.created_at, record.created_at);
    }

    #[tokio::test]
    async fn test_upsert_replaces_row() {
        let (_dir, store) = temp_store().await;
        let mut record = sample_record("s1");
        store.upsert(&record).await.unwrap();

        record.current_stage = "exploration".to_string();
        record.topic = Some("career_development".to_string());
        store.upsert(&record).await.unwrap();

        let loaded = store.load("s1").await.unwrap().unwrap();
        assert_eq!(loaded.current_stage, "exploration");
        assert_eq!(loaded.topic.as_deref(), Some("career_development"));
        assert_eq!(store.list_ids().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_and_missing_load() {
        let (_dir, store) = temp_store().await;
        store.upsert(&sample_record("s1")).await.unwrap();
        store.delete("s1").await.unwrap();
        assert!(store.load("s1").await.unwrap().is_none());
        assert!(store.load("never-existed").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_durable_flag() {
        let (_dir, store) = temp_store().await;
        assert!(store.is_durable());
    }
}
