//! In-memory session store
//!
//! Not persistent across restarts. Used in tests and with `--store memory`.

use async_trait::async_trait;
use sfl_common::Result;
use tokio::sync::RwLock;

use super::SessionStore;
use crate::model::Session;

#[derive(Debug, Default)]
pub struct MemoryStore {
    slot: RwLock<Option<Session>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `session`
    pub fn with_session(session: Session) -> Self {
        Self {
            slot: RwLock::new(Some(session)),
        }
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn load(&self) -> Option<Session> {
        self.slot.read().await.clone()
    }

    async fn save(&self, session: &Session) -> Result<()> {
        *self.slot.write().await = Some(session.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        *self.slot.write().await = None;
        Ok(())
    }

    fn backend_name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_store_loads_none() {
        assert!(MemoryStore::new().load().await.is_none());
    }

    #[tokio::test]
    async fn test_save_load_clear() {
        let store = MemoryStore::new();
        let session = Session::start(1500, 0);

        store.save(&session).await.unwrap();
        assert_eq!(store.load().await, Some(session));

        store.clear().await.unwrap();
        assert!(store.load().await.is_none());
    }

    #[tokio::test]
    async fn test_end_marks_inactive() {
        let store = MemoryStore::with_session(Session::start(1500, 0));

        let ended = store.end(42).await.unwrap().unwrap();
        assert!(!ended.is_active);
        assert_eq!(ended.end_time, Some(42));
        assert_eq!(store.load().await, Some(ended));
    }

    #[tokio::test]
    async fn test_end_without_record_is_noop() {
        let store = MemoryStore::new();
        assert!(store.end(42).await.unwrap().is_none());
        assert!(store.load().await.is_none());
    }
}
