use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post, MethodRouter},
    Router,
};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::{
    config::AppConfig, handlers, request_context::request_context_middleware,
    response_headers::response_headers_middleware, state::AppState,
};

/// Mount points for every endpoint: the legacy serverless path and `/api`.
pub const ROUTE_PREFIXES: [&str; 2] = ["/.netlify/functions", "/api"];

pub fn create_router(state: AppState) -> Router {
    let config = state.config.clone();

    let mut router = Router::new();
    for prefix in ROUTE_PREFIXES {
        router = router
            .route(&format!("{prefix}/submit-testimonial"), submit_routes(&config))
            .route(&format!("{prefix}/get-testimonials"), public_routes(&config))
            .route(&format!("{prefix}/admin-testimonials"), admin_routes(&config))
            .route(&format!("{prefix}/delete-testimonial"), delete_routes(&config));
    }

    router
        .fallback(handlers::not_found)
        .with_state(state)
        .layer(middleware::from_fn(response_headers_middleware))
        .layer(middleware::from_fn(request_context_middleware))
}

fn submit_routes(config: &AppConfig) -> MethodRouter<AppState> {
    post(handlers::submit_testimonial)
        .fallback(handlers::method_not_allowed)
        .layer(cors_layer(config, &[Method::POST], false))
}

fn public_routes(config: &AppConfig) -> MethodRouter<AppState> {
    get(handlers::list_testimonials)
        .fallback(handlers::method_not_allowed)
        .layer(cors_layer(config, &[Method::GET], false))
}

fn admin_routes(config: &AppConfig) -> MethodRouter<AppState> {
    get(handlers::list_pending)
        .post(handlers::approve_testimonial)
        .delete(handlers::reject_testimonial)
        .fallback(handlers::admin_method_not_allowed)
        .layer(cors_layer(config, &[Method::GET, Method::POST, Method::DELETE], true))
}

fn delete_routes(config: &AppConfig) -> MethodRouter<AppState> {
    post(handlers::delete_testimonial)
        .fallback(handlers::method_not_allowed)
        .layer(cors_layer(config, &[Method::POST], true))
}

/// Per-endpoint CORS. Every `OPTIONS` request is answered here with an empty
/// `200`, ahead of auth and method checks.
fn cors_layer(config: &AppConfig, methods: &[Method], with_authorization: bool) -> CorsLayer {
    let origin = match config
        .site_url
        .as_deref()
        .and_then(|site_url| HeaderValue::from_str(site_url).ok())
    {
        Some(site_url) => AllowOrigin::exact(site_url),
        None => AllowOrigin::any(),
    };

    let mut allowed_methods = methods.to_vec();
    allowed_methods.push(Method::OPTIONS);
    let mut allowed_headers = vec![header::CONTENT_TYPE];
    if with_authorization {
        allowed_headers.push(header::AUTHORIZATION);
    }

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(allowed_methods)
        .allow_headers(allowed_headers)
}
