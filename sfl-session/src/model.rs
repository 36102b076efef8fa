//! Session records
//!
//! Field names serialize in camelCase so a `session.json` written by earlier
//! overlay versions loads unchanged.

use serde::{Deserialize, Serialize};

/// Maximum number of history points retained for charting
pub const HISTORY_CAPACITY: usize = 30;

/// One inferred game result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    /// Rating after the match
    pub mr: i64,
    /// Rating before the match
    pub previous_mr: i64,
    /// `mr - previous_mr`, never zero
    pub change: i64,
    /// True iff `change > 0`
    pub win: bool,
    pub timestamp: i64,
}

/// One plotted sample
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryPoint {
    pub mr: i64,
    #[serde(default)]
    pub change: i64,
    /// `None` marks a sample with no inferred match (the seed point)
    #[serde(default)]
    pub win: Option<bool>,
    pub timestamp: i64,
}

impl HistoryPoint {
    /// Seed point of a new session
    pub fn seed(mr: i64, timestamp: i64) -> Self {
        Self {
            mr,
            change: 0,
            win: None,
            timestamp,
        }
    }

    /// Point produced by a recorded match
    pub fn from_match(m: &Match) -> Self {
        Self {
            mr: m.mr,
            change: m.change,
            win: Some(m.win),
            timestamp: m.timestamp,
        }
    }
}

/// A tracking window over consecutive rating observations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub is_active: bool,
    pub start_mr: i64,
    pub current_mr: i64,
    pub peak_mr: i64,
    /// Rating used for the next delta comparison
    pub last_mr: i64,
    pub start_time: i64,
    pub last_update: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<i64>,
    #[serde(default)]
    pub matches: Vec<Match>,
    #[serde(default)]
    pub mr_history: Vec<HistoryPoint>,
}

impl Session {
    /// Create an active session seeded with its first observation
    pub fn start(rating: i64, now: i64) -> Self {
        Self {
            is_active: true,
            start_mr: rating,
            current_mr: rating,
            peak_mr: rating,
            last_mr: rating,
            start_time: now,
            last_update: now,
            end_time: None,
            matches: Vec::new(),
            mr_history: vec![HistoryPoint::seed(rating, now)],
        }
    }

    /// Apply an observation to an active session
    ///
    /// Returns `true` if the rating differs from `last_mr` and a match was
    /// recorded. An unchanged rating only refreshes `last_update`, and seeds
    /// the history if a stored record arrived without one.
    pub fn record(&mut self, rating: i64, now: i64) -> bool {
        self.last_update = now;

        let change = match rating.checked_sub(self.last_mr) {
            Some(0) => {
                if self.mr_history.is_empty() {
                    self.mr_history.push(HistoryPoint::seed(rating, now));
                }
                return false;
            }
            Some(change) => change,
            // Only reachable from a tampered record; nothing sensible to infer
            None => return false,
        };

        let recorded = Match {
            mr: rating,
            previous_mr: self.last_mr,
            change,
            win: change > 0,
            timestamp: now,
        };

        self.current_mr = rating;
        self.last_mr = rating;
        self.peak_mr = self.peak_mr.max(rating);
        self.mr_history.push(HistoryPoint::from_match(&recorded));
        self.matches.push(recorded);
        self.truncate_history();

        true
    }

    /// Mark the session inactive, keeping all data
    pub fn finish(&mut self, now: i64) {
        self.is_active = false;
        self.end_time = Some(now);
    }

    /// Net rating change since the session started
    pub fn net_change(&self) -> i64 {
        self.current_mr.saturating_sub(self.start_mr)
    }

    /// Most recently recorded match
    pub fn last_match(&self) -> Option<&Match> {
        self.matches.last()
    }

    fn truncate_history(&mut self) {
        let len = self.mr_history.len();
        if len > HISTORY_CAPACITY {
            self.mr_history.drain(..len - HISTORY_CAPACITY);
        }
    }
}
