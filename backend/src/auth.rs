use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use sha2::{Digest, Sha256};

use crate::{error::ApiError, state::AppState};

/// Proof that the request carried the moderation bearer token.
#[derive(Debug, Clone, Copy)]
pub struct AdminAuth;

#[async_trait]
impl FromRequestParts<AppState> for AdminAuth {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let presented = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok());
        if state.is_admin_authorization(presented) {
            Ok(AdminAuth)
        } else {
            tracing::warn!("rejected moderation request with missing or invalid token");
            Err(ApiError::Unauthorized)
        }
    }
}

/// Compares fixed-size digests so timing does not depend on where the inputs
/// first differ or on their lengths.
pub fn constant_time_eq(left: &str, right: &str) -> bool {
    let left = Sha256::digest(left.as_bytes());
    let right = Sha256::digest(right.as_bytes());
    left.iter()
        .zip(right.iter())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}
