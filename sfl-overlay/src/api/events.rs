//! SSE stream of session events

use axum::{
    extract::State,
    response::sse::{Event, Sse},
};
use futures::stream::Stream;
use std::convert::Infallible;
use tracing::debug;

use crate::AppState;

/// GET /events
///
/// Streams `SessionStarted`, `MatchRecorded`, `SessionEnded` and
/// `SessionReset` events to overlay pages.
pub async fn event_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    debug!("New SSE client connected");
    sfl_common::sse::overlay_event_stream(state.events.subscribe())
}
