//! Player data intake
//!
//! The browser userscript posts the scraped player card here once per page
//! refresh. The rating feeds the session engine; the whole payload is kept
//! for `/data.json` and the text fields.

use axum::{
    body::Bytes,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use sfl_common::{time, OverlayEvent};
use sfl_session::rating::parse_rating;
use sfl_session::Submission;
use tracing::{info, warn};

use crate::error::ApiError;
use crate::AppState;

/// Response to an accepted observation
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiveResponse {
    pub status: String,
    pub mr_changed: bool,
    pub is_new_session: bool,
}

/// POST /receiver
///
/// Rejects payloads without a numeric `mr` before touching any state.
/// Intake holds the output lock from commit to the last artifact write, so
/// files on disk always reflect the most recently committed observation.
pub async fn receive_player_data(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ReceiveResponse>, ApiError> {
    let data: Value = serde_json::from_slice(&body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid JSON: {}", e)))?;
    if !data.is_object() {
        return Err(ApiError::BadRequest("Payload must be a JSON object".to_string()));
    }

    let rating = parse_rating(data.get("mr").unwrap_or(&Value::Null)).map_err(|e| {
        warn!("Rejected observation: {}", e);
        ApiError::from(e)
    })?;

    let _writes = state.output.lock_writes().await;

    let submission = state.engine.submit_observation(rating).await?;
    save_player_data(&state, &data).await;
    publish_events(&state, &submission);
    state
        .output
        .publish(&data, rating, &submission.session, submission.change)
        .await;

    let lp = data.get("lp").unwrap_or(&Value::Null);
    let ml = data
        .get("ml")
        .filter(|v| !v.is_null())
        .or_else(|| data.get("league_rank_number"))
        .unwrap_or(&Value::Null);
    info!("Updated data: MR={}, LP={}, ML={}", rating, lp, ml);

    Ok(Json(ReceiveResponse {
        status: "ok".to_string(),
        mr_changed: submission.change.mr_changed,
        is_new_session: submission.change.is_new_session,
    }))
}

/// GET /data.json
pub async fn get_player_data(State(state): State<AppState>) -> Result<Response, ApiError> {
    match tokio::fs::read(state.player_data_path()).await {
        Ok(bytes) => Ok(([(header::CONTENT_TYPE, "application/json")], bytes).into_response()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(ApiError::NotFound("No data yet".to_string()))
        }
        Err(e) => Err(ApiError::Session(e.into())),
    }
}

/// Persist `{timestamp, data}` for `/data.json`
///
/// Written via temp file + rename under the output lock; failures are
/// logged only.
async fn save_player_data(state: &AppState, data: &Value) {
    let payload = json!({
        "timestamp": time::now_millis(),
        "data": data,
    });
    let path = state.player_data_path();
    let temp = path.with_extension("json.tmp");

    let result = async {
        let encoded = serde_json::to_vec_pretty(&payload)?;
        tokio::fs::write(&temp, encoded).await?;
        tokio::fs::rename(&temp, &path).await?;
        Ok::<_, sfl_common::Error>(())
    }
    .await;

    if let Err(e) = result {
        warn!("Failed to save {}: {}", path.display(), e);
    }
}

fn publish_events(state: &AppState, submission: &Submission) {
    let session = &submission.session;

    if submission.change.is_new_session {
        state.events.publish(OverlayEvent::SessionStarted {
            start_mr: session.start_mr,
            timestamp: time::now(),
        });
    }

    if submission.change.mr_changed {
        if let Some(m) = session.last_match() {
            state.events.publish(OverlayEvent::MatchRecorded {
                mr: m.mr,
                previous_mr: m.previous_mr,
                change: m.change,
                win: m.win,
                timestamp: time::now(),
            });
        }
    }
}
