//! Session engine
//!
//! Owns the session lifecycle: implicit creation on the first observation,
//! match inference from rating deltas, explicit end and reset. Every write
//! path runs load → compute → save under one lock so concurrent submissions
//! cannot lose matches.

use serde::Serialize;
use sfl_common::{Clock, Result, SystemClock};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

use crate::model::Session;
use crate::stats::{compute_stats, SessionStats};
use crate::store::SessionStore;

/// What an observation did to the session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeDescriptor {
    /// A match was recorded
    pub mr_changed: bool,
    /// The observation created a new session
    pub is_new_session: bool,
}

impl ChangeDescriptor {
    /// Whether derived chart artifacts for `session` are stale
    pub fn needs_render(&self, session: &Session) -> bool {
        (self.mr_changed || self.is_new_session) && !session.mr_history.is_empty()
    }
}

/// Committed result of one observation
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub session: Session,
    pub change: ChangeDescriptor,
}

pub struct SessionEngine {
    store: Arc<dyn SessionStore>,
    clock: Arc<dyn Clock>,
    write_lock: Mutex<()>,
}

impl SessionEngine {
    /// Engine using the system clock
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    pub fn with_clock(store: Arc<dyn SessionStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            write_lock: Mutex::new(()),
        }
    }

    /// Name of the backing store (for logging)
    pub fn store_name(&self) -> &str {
        self.store.backend_name()
    }

    /// Apply one rating observation
    ///
    /// The returned session has been persisted. On a store error nothing is
    /// considered committed.
    pub async fn submit_observation(&self, rating: i64) -> Result<Submission> {
        let _guard = self.write_lock.lock().await;
        let now = self.clock.now_millis();

        // No active session: the observation seeds a new one
        let mut session = match self.store.load().await {
            Some(session) if session.is_active => session,
            _ => {
                let session = Session::start(rating, now);
                self.persist(&session).await?;
                info!("Created new session - start MR: {}", rating);
                return Ok(Submission {
                    session,
                    change: ChangeDescriptor {
                        mr_changed: false,
                        is_new_session: true,
                    },
                });
            }
        };

        let mr_changed = session.record(rating, now);
        self.persist(&session).await?;

        if let (true, Some(m)) = (mr_changed, session.last_match()) {
            info!(
                "Recorded match: {} ({:+}) {} -> {}",
                if m.win { "WIN" } else { "LOSS" },
                m.change,
                m.previous_mr,
                m.mr
            );
        } else {
            debug!("MR unchanged at {}", rating);
        }

        Ok(Submission {
            session,
            change: ChangeDescriptor {
                mr_changed,
                is_new_session: false,
            },
        })
    }

    /// End the stored session, keeping its data
    ///
    /// Returns `None` if there was no session.
    pub async fn end(&self) -> Result<Option<Session>> {
        let _guard = self.write_lock.lock().await;
        let now = self.clock.now_millis();
        self.store.end(now).await.inspect_err(|e| {
            error!("Failed to end session: {}", e);
        })
    }

    /// Discard the stored session
    pub async fn reset(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.store.clear().await.inspect_err(|e| {
            error!("Failed to reset session: {}", e);
        })?;
        info!("Session reset");
        Ok(())
    }

    /// Current stored session, if any
    pub async fn current(&self) -> Option<Session> {
        self.store.load().await
    }

    /// Current session together with its statistics
    pub async fn status(&self) -> (Option<Session>, SessionStats) {
        let session = self.store.load().await;
        let stats = compute_stats(session.as_ref());
        (session, stats)
    }

    async fn persist(&self, session: &Session) -> Result<()> {
        self.store.save(session).await.inspect_err(|e| {
            error!("Failed to save session ({}): {}", self.store.backend_name(), e);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{HistoryPoint, Match, HISTORY_CAPACITY};
    use crate::store::MemoryStore;
    use async_trait::async_trait;
    use sfl_common::time::ManualClock;
    use sfl_common::Error;

    fn engine_with(store: Arc<dyn SessionStore>) -> (SessionEngine, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(1_000));
        (SessionEngine::with_clock(store, clock.clone()), clock)
    }

    fn memory_engine() -> (SessionEngine, Arc<MemoryStore>, Arc<ManualClock>) {
        let store = Arc::new(MemoryStore::new());
        let (engine, clock) = engine_with(store.clone());
        (engine, store, clock)
    }

    #[tokio::test]
    async fn test_first_observation_creates_session() {
        let (engine, store, _) = memory_engine();

        let result = engine.submit_observation(1500).await.unwrap();

        assert_eq!(
            result.change,
            ChangeDescriptor { mr_changed: false, is_new_session: true }
        );
        let session = &result.session;
        assert_eq!(session.start_mr, 1500);
        assert_eq!(session.current_mr, 1500);
        assert_eq!(session.peak_mr, 1500);
        assert_eq!(session.mr_history, vec![HistoryPoint::seed(1500, 1_000)]);
        assert!(session.matches.is_empty());
        assert_eq!(store.load().await.as_ref(), Some(session));
    }

    #[tokio::test]
    async fn test_rating_increase_records_win() {
        let (engine, _, clock) = memory_engine();
        engine.submit_observation(1500).await.unwrap();
        clock.advance(60_000);

        let result = engine.submit_observation(1550).await.unwrap();

        assert!(result.change.mr_changed);
        assert!(!result.change.is_new_session);
        assert_eq!(
            result.session.matches,
            vec![Match { mr: 1550, previous_mr: 1500, change: 50, win: true, timestamp: 61_000 }]
        );
        assert_eq!(result.session.peak_mr, 1550);
        assert_eq!(result.session.mr_history.len(), 2);
    }

    #[tokio::test]
    async fn test_repeated_rating_is_noop_except_last_update() {
        let (engine, _, clock) = memory_engine();
        engine.submit_observation(1500).await.unwrap();
        let first = engine.submit_observation(1550).await.unwrap();
        clock.advance(5_000);

        let second = engine.submit_observation(1550).await.unwrap();

        assert!(!second.change.mr_changed);
        assert_eq!(second.session.matches, first.session.matches);
        assert_eq!(second.session.mr_history, first.session.mr_history);
        assert_eq!(second.session.last_update, first.session.last_update + 5_000);
    }

    #[tokio::test]
    async fn test_stored_session_without_history_is_reseeded() {
        let mut stored = Session::start(1500, 0);
        stored.mr_history.clear();
        let store = Arc::new(MemoryStore::with_session(stored));
        let (engine, _) = engine_with(store.clone());

        let result = engine.submit_observation(1500).await.unwrap();

        assert!(!result.change.mr_changed);
        assert_eq!(result.session.mr_history, vec![HistoryPoint::seed(1500, 1_000)]);
        let persisted = store.load().await.unwrap();
        assert_eq!(persisted.mr_history.len(), 1);
    }

    #[tokio::test]
    async fn test_ended_session_is_replaced_by_next_observation() {
        let (engine, _, _) = memory_engine();
        engine.submit_observation(1500).await.unwrap();
        engine.submit_observation(1520).await.unwrap();

        let ended = engine.end().await.unwrap().unwrap();
        assert!(!ended.is_active);
        assert_eq!(ended.matches.len(), 1);

        let result = engine.submit_observation(1600).await.unwrap();
        assert!(result.change.is_new_session);
        assert_eq!(result.session.start_mr, 1600);
        assert!(result.session.matches.is_empty());
    }

    #[tokio::test]
    async fn test_end_without_session_returns_none() {
        let (engine, _, _) = memory_engine();
        assert!(engine.end().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_reset_discards_session() {
        let (engine, _, _) = memory_engine();
        engine.submit_observation(1500).await.unwrap();

        engine.reset().await.unwrap();

        assert!(engine.current().await.is_none());
        let (session, stats) = engine.status().await;
        assert!(session.is_none());
        assert_eq!(stats, SessionStats::default());
    }

    #[tokio::test]
    async fn test_history_capped_at_capacity() {
        let (engine, _, _) = memory_engine();
        for i in 0..50 {
            engine.submit_observation(1500 + i).await.unwrap();
        }

        let session = engine.current().await.unwrap();
        assert_eq!(session.mr_history.len(), HISTORY_CAPACITY);
        let mrs: Vec<i64> = session.mr_history.iter().map(|p| p.mr).collect();
        let expected: Vec<i64> = (1520..1550).collect();
        assert_eq!(mrs, expected);
        assert_eq!(session.matches.len(), 49);
    }

    #[tokio::test]
    async fn test_concurrent_submissions_do_not_lose_matches() {
        let store = Arc::new(MemoryStore::new());
        let engine = Arc::new(SessionEngine::new(store));
        engine.submit_observation(0).await.unwrap();

        // Distinct nonzero ratings: every submission must differ from whatever
        // ran before it, so each one records exactly one match.
        let handles: Vec<_> = (1..=20)
            .map(|i| {
                let engine = engine.clone();
                tokio::spawn(async move { engine.submit_observation(i * 10).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let session = engine.current().await.unwrap();
        assert_eq!(session.matches.len(), 20);
    }

    /// Store whose writes always fail
    struct FailingStore;

    #[async_trait]
    impl SessionStore for FailingStore {
        async fn load(&self) -> Option<Session> {
            None
        }

        async fn save(&self, _session: &Session) -> Result<()> {
            Err(Error::Storage("disk full".to_string()))
        }

        async fn clear(&self) -> Result<()> {
            Err(Error::Storage("disk full".to_string()))
        }

        fn backend_name(&self) -> &str {
            "failing"
        }
    }

    #[tokio::test]
    async fn test_write_failure_is_surfaced() {
        let (engine, _) = engine_with(Arc::new(FailingStore));

        assert!(matches!(
            engine.submit_observation(1500).await,
            Err(Error::Storage(_))
        ));
        assert!(engine.reset().await.is_err());
    }

    #[test]
    fn test_needs_render() {
        let session = Session::start(1500, 0);
        let idle = ChangeDescriptor::default();
        let changed = ChangeDescriptor { mr_changed: true, is_new_session: false };
        let fresh = ChangeDescriptor { mr_changed: false, is_new_session: true };

        assert!(!idle.needs_render(&session));
        assert!(changed.needs_render(&session));
        assert!(fresh.needs_render(&session));

        let mut empty = session.clone();
        empty.mr_history.clear();
        assert!(!changed.needs_render(&empty));
    }
}
