//! HTTP backend for the portfolio testimonial workflow: public submission,
//! the approved-testimonial feed and the moderation endpoints, all proxied
//! onto an Airtable table.

pub mod auth;
pub mod client_ip;
pub mod config;
pub mod error;
pub mod handlers;
pub mod notify;
pub mod rate_limit;
pub mod rebuild;
pub mod request_context;
pub mod response_headers;
pub mod routes;
pub mod row_store;
pub mod state;

pub use config::AppConfig;
pub use routes::create_router;
pub use state::AppState;
