//! JSON bodies exchanged between the browser, the moderation tool and the
//! backend.

use serde::{Deserialize, Serialize};

use crate::testimonial::{PendingTestimonial, PublicTestimonial};

/// `201` body of `submit-testimonial`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub success: bool,
    pub message: String,
}

/// `200` body of `get-testimonials`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicListResponse {
    pub testimonials: Vec<PublicTestimonial>,
    pub count: usize,
    #[serde(rename = "lastUpdated")]
    pub last_updated: String,
}

/// `200` body of `admin-testimonials` GET.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingListResponse {
    pub testimonials: Vec<PendingTestimonial>,
}

/// Approve/reject acknowledgement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionResponse {
    pub success: bool,
    pub message: String,
}

/// `200` body of `delete-testimonial`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
    #[serde(rename = "deletedId")]
    pub deleted_id: String,
}

/// Approve/reject request body of `admin-testimonials`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModerationRequest {
    #[serde(rename = "testimonialId", default)]
    pub testimonial_id: Option<String>,
}

/// Request body of `delete-testimonial`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeleteRequest {
    #[serde(default)]
    pub id: Option<String>,
}

/// Every non-2xx body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
    #[serde(rename = "retryAfter", default, skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<u64>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
            retry_after: None,
        }
    }
}
