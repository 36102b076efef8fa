//! SQLite session store
//!
//! One row (`id = 1`) in `session_record` holds the JSON-encoded session.
//! Saves are a single upsert statement, so readers never observe a partial
//! record.

use async_trait::async_trait;
use sfl_common::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use tracing::{info, warn};

use super::SessionStore;
use crate::model::Session;

/// File name of the session database inside the root folder
pub const SESSION_DB_NAME: &str = "session.db";

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS session_record (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    payload TEXT NOT NULL,
    updated_at INTEGER NOT NULL
)";

#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if missing) the database at `db_path`
    pub async fn open(db_path: &Path) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await?;

        info!("Opened session database at {}", db_path.display());
        Self::from_pool(pool).await
    }

    /// In-memory database (single connection so all queries share it)
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        Self::from_pool(pool).await
    }

    /// Wrap an existing pool, creating the table if needed
    pub async fn from_pool(pool: SqlitePool) -> Result<Self> {
        sqlx::query(CREATE_TABLE).execute(&pool).await?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl SessionStore for SqliteStore {
    async fn load(&self) -> Option<Session> {
        let payload = match sqlx::query_scalar::<_, String>(
            "SELECT payload FROM session_record WHERE id = 1",
        )
        .fetch_optional(&self.pool)
        .await
        {
            Ok(payload) => payload?,
            Err(e) => {
                warn!("Failed to read session record: {}", e);
                return None;
            }
        };

        match serde_json::from_str(&payload) {
            Ok(session) => Some(session),
            Err(e) => {
                warn!("Ignoring corrupt session record: {}", e);
                None
            }
        }
    }

    async fn save(&self, session: &Session) -> Result<()> {
        let payload = serde_json::to_string(session)?;

        sqlx::query(
            "INSERT INTO session_record (id, payload, updated_at) VALUES (1, ?, ?)
             ON CONFLICT(id) DO UPDATE SET payload = excluded.payload, updated_at = excluded.updated_at",
        )
        .bind(payload)
        .bind(session.last_update)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        sqlx::query("DELETE FROM session_record")
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    fn backend_name(&self) -> &str {
        "sqlite"
    }
}
