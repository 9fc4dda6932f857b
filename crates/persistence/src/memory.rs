//! In-memory session store (default)

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::{PersistenceError, SessionRecord, SessionStore};

/// Stores rows in a process-local map; nothing survives a restart
#[derive(Default)]
pub struct InMemorySessionStore {
    rows: RwLock<HashMap<String, SessionRecord>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn upsert(&self, record: &SessionRecord) -> Result<(), PersistenceError> {
        self.rows.write().insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn load(&self, id: &str) -> Result<Option<SessionRecord>, PersistenceError> {
        Ok(self.rows.read().get(id).cloned())
    }

    async fn delete(&self, id: &str) -> Result<(), PersistenceError> {
        self.rows.write().remove(id);
        Ok(())
    }

    async fn list_ids(&self) -> Result<Vec<String>, PersistenceError> {
        Ok(self.rows.read().keys().cloned().collect())
    }

    fn is_durable(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_record(id: &str) -> SessionRecord {
        SessionRecord {
            id: id.to_string(),
            user_id: "user-1".to_string(),
            topic: Some("performance_improvement".to_string()),
            current_stage: "exploration".to_string(),
            conversation_history: "[]".to_string(),
            insights: "[]".to_string(),
            actions: "[]".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_upsert_and_load() {
        let store = InMemorySessionStore::new();
        let record = sample_record("s1");

        store.upsert(&record).await.unwrap();
        let loaded = store.load("s1").await.unwrap().unwrap();
        assert_eq!(loaded, record);

        assert!(store.load("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upsert_is_idempotent_replace() {
        let store = InMemorySessionStore::new();
        let mut record = sample_record("s1");
        store.upsert(&record).await.unwrap();

        record.current_stage = "reflection".to_string();
        store.upsert(&record).await.unwrap();

        let loaded = store.load("s1").await.unwrap().unwrap();
        assert_eq!(loaded.current_stage, "reflection");
        assert_eq!(store.list_ids().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete() {
        let store = InMemorySessionStore::new();
        store.upsert(&sample_record("s1")).await.unwrap();
        store.delete("s1").await.unwrap();
        assert!(store.load("s1").await.unwrap().is_none());
    }

    #[test]
    fn test_not_durable() {
        assert!(!InMemorySessionStore::new().is_durable());
    }
}
