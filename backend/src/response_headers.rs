use axum::{
    extract::Request,
    http::{header, HeaderMap, HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};

static FIXED_HEADERS: [(HeaderName, &str); 7] = [
    (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
    (header::X_FRAME_OPTIONS, "DENY"),
    (header::X_XSS_PROTECTION, "1; mode=block"),
    (header::REFERRER_POLICY, "strict-origin-when-cross-origin"),
    (header::CACHE_CONTROL, "no-cache, no-store, must-revalidate"),
    (header::PRAGMA, "no-cache"),
    (header::EXPIRES, "0"),
];

/// Hardening and no-cache headers on every response, including preflights.
pub async fn response_headers_middleware(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    apply_fixed_headers(response.headers_mut());
    response
}

fn apply_fixed_headers(headers: &mut HeaderMap) {
    for (name, value) in &FIXED_HEADERS {
        headers.insert(name.clone(), HeaderValue::from_static(value));
    }
    headers
        .entry(header::CONTENT_TYPE)
        .or_insert(HeaderValue::from_static("application/json"));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_existing_content_type_and_overrides_cache_policy() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("max-age=600"));
        apply_fixed_headers(&mut headers);
        assert_eq!(headers[header::CONTENT_TYPE], "text/plain");
        assert_eq!(headers[header::CACHE_CONTROL], "no-cache, no-store, must-revalidate");
        assert_eq!(headers[header::X_FRAME_OPTIONS], "DENY");
        assert_eq!(headers[header::EXPIRES], "0");
    }

    #[test]
    fn empty_responses_are_labelled_json() {
        let mut headers = HeaderMap::new();
        apply_fixed_headers(&mut headers);
        assert_eq!(headers[header::CONTENT_TYPE], "application/json");
    }
}
