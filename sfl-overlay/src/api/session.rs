//! Session status and lifecycle control

use axum::{extract::State, Json};
use serde::Serialize;
use sfl_common::{time, OverlayEvent};
use sfl_session::{Session, SessionStats};
use tracing::info;

use super::StatusResponse;
use crate::error::ApiError;
use crate::AppState;

/// Current session and its statistics
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    /// `null` when no session exists
    pub session: Option<Session>,
    pub stats: SessionStats,
}

/// GET /api/session
pub async fn get_session(State(state): State<AppState>) -> Json<SessionResponse> {
    let (session, stats) = state.engine.status().await;
    Json(SessionResponse { session, stats })
}

/// POST /api/session/end
///
/// Marks the session inactive and keeps its data. The next observation
/// starts a new session.
pub async fn end_session(State(state): State<AppState>) -> Result<Json<StatusResponse>, ApiError> {
    match state.engine.end().await? {
        Some(session) => {
            info!("Operator ended session - total matches: {}", session.matches.len());
            state.events.publish(OverlayEvent::SessionEnded {
                total_matches: session.matches.len(),
                timestamp: time::now(),
            });
            Ok(Json(StatusResponse::ok("Session ended")))
        }
        None => Ok(Json(StatusResponse::ok("No session to end"))),
    }
}

/// POST /api/session/reset
///
/// Discards the session irrecoverably.
pub async fn reset_session(State(state): State<AppState>) -> Result<Json<StatusResponse>, ApiError> {
    state.engine.reset().await?;
    state.events.publish(OverlayEvent::SessionReset { timestamp: time::now() });
    Ok(Json(StatusResponse::ok("Session reset")))
}
