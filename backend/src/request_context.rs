use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::Instant,
};

use axum::{
    extract::Request,
    http::{HeaderMap, HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::Instrument;

pub const REQUEST_ID_HEADER: &str = "x-request-id";
pub const TRACE_ID_HEADER: &str = "x-trace-id";

static REQUEST_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Runs the request inside an `http_request` span and echoes the correlation
/// ids back to the caller.
pub async fn request_context_middleware(request: Request, next: Next) -> Response {
    let request_id = incoming_id(request.headers(), REQUEST_ID_HEADER)
        .unwrap_or_else(|| generate_id("req"));
    let trace_id =
        incoming_id(request.headers(), TRACE_ID_HEADER).unwrap_or_else(|| generate_id("trace"));

    let span = tracing::info_span!(
        "http_request",
        request_id = %request_id,
        trace_id = %trace_id,
        method = %request.method(),
        path = %request.uri().path(),
    );
    let started_at = Instant::now();
    let mut response = next.run(request).instrument(span.clone()).await;

    for (name, value) in [(REQUEST_ID_HEADER, &request_id), (TRACE_ID_HEADER, &trace_id)] {
        if let Ok(value) = HeaderValue::from_str(value) {
            response.headers_mut().insert(HeaderName::from_static(name), value);
        }
    }

    let status = response.status();
    let elapsed_ms = started_at.elapsed().as_millis();
    if status.is_server_error() {
        tracing::warn!(parent: &span, status = status.as_u16(), elapsed_ms, "request completed");
    } else {
        tracing::info!(parent: &span, status = status.as_u16(), elapsed_ms, "request completed");
    }
    response
}

fn incoming_id(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToOwned::to_owned)
}

fn generate_id(prefix: &str) -> String {
    let now_ms = chrono::Utc::now().timestamp_millis();
    let counter = REQUEST_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}-{now_ms:x}-{counter:08x}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incoming_ids_are_trimmed_and_blank_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_static("  abc-1 "));
        headers.insert(TRACE_ID_HEADER, HeaderValue::from_static("   "));
        assert_eq!(incoming_id(&headers, REQUEST_ID_HEADER).as_deref(), Some("abc-1"));
        assert_eq!(incoming_id(&headers, TRACE_ID_HEADER), None);
    }

    #[test]
    fn generated_ids_are_unique() {
        let first = generate_id("req");
        let second = generate_id("req");
        assert!(first.starts_with("req-"));
        assert_ne!(first, second);
    }
}
