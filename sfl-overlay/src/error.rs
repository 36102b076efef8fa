//! HTTP error type for sfl-overlay handlers

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Handler error, rendered as `{"error": message}`
#[derive(Error, Debug)]
pub enum ApiError {
    /// Malformed request body
    #[error("{0}")]
    BadRequest(String),

    /// Resource not available yet
    #[error("{0}")]
    NotFound(String),

    /// Session engine or store failure
    #[error(transparent)]
    Session(#[from] sfl_common::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Session(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            ApiError::Session(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.to_string(),
        }));
        (self.status(), body).into_response()
    }
}
