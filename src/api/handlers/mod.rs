//! API handlers and shared utilities for Vetrina.

pub mod auth;
pub mod contact;
pub mod health;
pub mod messages;
pub mod root;
pub mod settings;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Uniform JSON failure envelope: `{"error": "<message>"}`.
///
/// Handlers log the real cause and hand the client only this generic body.
pub(crate) fn json_error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}
