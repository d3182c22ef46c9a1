//! Endpoint handlers. Each endpoint is mounted under both
//! `/.netlify/functions/<name>` and `/api/<name>`.

mod admin;
mod public;
mod submit;

use axum::{body::Bytes, http::StatusCode, response::IntoResponse, Json};
use folio_shared::api::ErrorBody;
use serde::de::DeserializeOwned;

pub use admin::{
    admin_method_not_allowed, approve_testimonial, delete_testimonial, list_pending,
    reject_testimonial,
};
pub use public::{list_testimonials, visible_testimonials};
pub use submit::submit_testimonial;

use crate::error::ApiError;

pub const INVALID_BODY_MESSAGE: &str = "Invalid request body";

/// Decode a JSON body; anything unreadable is a client error.
pub(crate) fn parse_json_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|err| {
        tracing::debug!("rejecting unreadable request body: {err}");
        ApiError::BadRequest(INVALID_BODY_MESSAGE)
    })
}

pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(ErrorBody::new("Not found")))
}

/// Trimmed id, or `None` when absent or blank.
pub(crate) fn required_id(raw: Option<String>) -> Option<String> {
    raw.map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
}
