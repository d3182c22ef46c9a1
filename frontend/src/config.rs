//! Compile-time settings for the testimonial widgets.

/// Base path of the serverless endpoints. Override with `FOLIO_API_BASE` at
/// build time when the backend runs on another origin.
pub const API_BASE: &str = match option_env!("FOLIO_API_BASE") {
    Some(url) => url,
    None => "/.netlify/functions",
};

/// Address offered in the `mailto:` fallback when submissions keep failing.
pub const CONTACT_EMAIL: &str = match option_env!("FOLIO_CONTACT_EMAIL") {
    Some(address) => address,
    None => "hello@example.com",
};

/// Lets the page's other widgets settle before the carousel is rebuilt.
pub const LOAD_DELAY_MS: u32 = 3_000;
pub const AUTOPLAY_INTERVAL_MS: u32 = 5_000;
pub const SUCCESS_CLOSE_DELAY_MS: u32 = 3_000;
pub const ERROR_HIDE_DELAY_MS: u32 = 5_000;

pub const CAROUSEL_HOST_ID: &str = "testimonial-carousel";
pub const SECTION_ID: &str = "testimonials";
pub const ATTEMPTS_STORAGE_KEY: &str = "testimonialAttempts";

pub fn endpoint(name: &str) -> String {
    format!("{}/{}", API_BASE.trim_end_matches('/'), name)
}
