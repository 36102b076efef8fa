//! HTTP API handlers for sfl-overlay

pub mod buildinfo;
pub mod events;
pub mod health;
pub mod receiver;
pub mod session;

pub use buildinfo::get_build_info;
pub use events::event_stream;
pub use health::health_routes;
pub use receiver::{get_player_data, receive_player_data};
pub use session::{end_session, get_session, reset_session};

use serde::Serialize;

/// Acknowledgement body for lifecycle commands
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
    pub message: String,
}

impl StatusResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            status: "ok".to_string(),
            message: message.into(),
        }
    }
}
