use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use folio_shared::api::ErrorBody;
use thiserror::Error;

use crate::row_store::RowStoreError;

pub const GENERIC_SUBMIT_FAILURE: &str = "Internal server error. Please try again later.";
pub const GENERIC_FAILURE: &str = "Internal server error";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Validation failed")]
    Validation(Vec<String>),

    #[error("{0}")]
    BadRequest(&'static str),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Too many submissions. Please try again later.")]
    RateLimited { retry_after: u64 },

    /// Row store failure; the caller only sees `public_message`.
    #[error("{public_message}")]
    Upstream {
        public_message: &'static str,
        #[source]
        source: RowStoreError,
    },
}

impl ApiError {
    pub fn upstream(public_message: &'static str, source: RowStoreError) -> Self {
        ApiError::Upstream {
            public_message,
            source,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Upstream { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let mut body = ErrorBody::new(self.to_string());
        let mut retry_after_header = None;
        match self {
            ApiError::Validation(details) => body.details = Some(details),
            ApiError::RateLimited { retry_after } => {
                body.retry_after = Some(retry_after);
                retry_after_header = HeaderValue::from_str(&retry_after.to_string()).ok();
            },
            ApiError::Upstream {
                public_message,
                source,
            } => tracing::error!("{public_message}: {source}"),
            _ => {},
        }

        let mut response = (status, Json(body)).into_response();
        if let Some(value) = retry_after_header {
            response.headers_mut().insert(header::RETRY_AFTER, value);
        }
        response
    }
}
