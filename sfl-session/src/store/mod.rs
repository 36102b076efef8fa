//! Single-slot session persistence
//!
//! The engine depends only on [`SessionStore`]; backends live in the
//! submodules. Every backend must make `save` atomic from a reader's point of
//! view and must report unreadable records as absent rather than failing.

use async_trait::async_trait;
use sfl_common::Result;
use tracing::info;

use crate::model::Session;

pub mod json_file;
pub mod memory;
pub mod sqlite;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Durable storage for one session record
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Most recently saved record
    ///
    /// Returns `None` if nothing is stored or the stored record is corrupt.
    async fn load(&self) -> Option<Session>;

    /// Overwrite the stored record
    async fn save(&self, session: &Session) -> Result<()>;

    /// Delete the stored record (no-op if empty)
    async fn clear(&self) -> Result<()>;

    /// Mark the stored session inactive and stamp its end time
    ///
    /// Returns the ended session, or `None` if no record exists.
    async fn end(&self, now: i64) -> Result<Option<Session>> {
        let Some(mut session) = self.load().await else {
            return Ok(None);
        };

        session.finish(now);
        self.save(&session).await?;
        info!(
            "Session ended ({}) - total matches: {}",
            self.backend_name(),
            session.matches.len()
        );
        Ok(Some(session))
    }

    /// Name of this backend (for logging)
    fn backend_name(&self) -> &str;
}
