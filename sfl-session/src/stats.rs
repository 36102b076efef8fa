//! Session statistics projection

use serde::{Deserialize, Serialize};

use crate::model::Session;

/// Aggregate win/loss statistics of a session
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStats {
    pub wins: usize,
    pub losses: usize,
    pub total: usize,
    /// Percentage rounded to one decimal place
    pub win_rate: f64,
}

/// Derive statistics from a session's matches
///
/// An absent session yields all-zero statistics.
pub fn compute_stats(session: Option<&Session>) -> SessionStats {
    let Some(session) = session else {
        return SessionStats::default();
    };

    let wins = session.matches.iter().filter(|m| m.win).count();
    let losses = session.matches.len() - wins;
    let total = wins + losses;

    let win_rate = if total > 0 {
        (wins as f64 / total as f64 * 1000.0).round() / 10.0
    } else {
        0.0
    };

    SessionStats {
        wins,
        losses,
        total,
        win_rate,
    }
}
