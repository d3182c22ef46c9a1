//! Moderation endpoints. Every handler takes [`AdminAuth`] first so the token
//! is checked before the method or body.

use axum::{body::Bytes, extract::State, Json};
use chrono::Utc;
use folio_shared::{
    api::{ActionResponse, DeleteRequest, DeleteResponse, ModerationRequest, PendingListResponse},
    TestimonialFields, TestimonialRecord,
};

use super::{parse_json_body, required_id};
use crate::{
    auth::AdminAuth,
    error::{ApiError, GENERIC_FAILURE},
    row_store::LIST_LIMIT,
    state::AppState,
};

const MODERATION_ID_REQUIRED: &str = "Testimonial ID required";
const DELETE_ID_REQUIRED: &str = "Testimonial ID is required";

/// `GET admin-testimonials`: rows awaiting review, email included.
pub async fn list_pending(
    _auth: AdminAuth,
    State(state): State<AppState>,
) -> Result<Json<PendingListResponse>, ApiError> {
    let records = state
        .row_store
        .list_records(Some(LIST_LIMIT))
        .await
        .map_err(|err| ApiError::upstream(GENERIC_FAILURE, err))?;
    let testimonials = records
        .iter()
        .filter_map(TestimonialRecord::to_pending)
        .collect();
    Ok(Json(PendingListResponse { testimonials }))
}

/// `POST admin-testimonials`: stamp today's date into `approvedAt`, then ask
/// for a site rebuild. A failed rebuild does not undo the approval.
pub async fn approve_testimonial(
    _auth: AdminAuth,
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ActionResponse>, ApiError> {
    let request: ModerationRequest = parse_json_body(&body)?;
    let id = required_id(request.testimonial_id)
        .ok_or(ApiError::BadRequest(MODERATION_ID_REQUIRED))?;

    let fields = TestimonialFields {
        approved_at: Some(Utc::now().format("%Y-%m-%d").to_string()),
        ..TestimonialFields::default()
    };
    state
        .row_store
        .update_fields(&id, &fields)
        .await
        .map_err(|err| ApiError::upstream(GENERIC_FAILURE, err))?;
    tracing::info!("testimonial {id} approved");

    if let Some(hook) = &state.rebuild_hook {
        if let Err(err) = hook.trigger().await {
            tracing::warn!("rebuild after approving {id} failed: {err:#}");
        }
    }

    Ok(Json(ActionResponse {
        success: true,
        message: "Testimonial approved".to_string(),
    }))
}

/// `DELETE admin-testimonials`: drop the row outright.
pub async fn reject_testimonial(
    _auth: AdminAuth,
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ActionResponse>, ApiError> {
    let request: ModerationRequest = parse_json_body(&body)?;
    let id = required_id(request.testimonial_id)
        .ok_or(ApiError::BadRequest(MODERATION_ID_REQUIRED))?;

    state
        .row_store
        .delete_record(&id)
        .await
        .map_err(|err| ApiError::upstream(GENERIC_FAILURE, err))?;
    tracing::info!("testimonial {id} rejected");

    Ok(Json(ActionResponse {
        success: true,
        message: "Testimonial rejected".to_string(),
    }))
}

/// Any other verb on `admin-testimonials`, after the token check.
pub async fn admin_method_not_allowed(_auth: AdminAuth) -> ApiError {
    ApiError::MethodNotAllowed
}

/// `POST delete-testimonial`: remove any row, approved or not.
pub async fn delete_testimonial(
    _auth: AdminAuth,
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<DeleteResponse>, ApiError> {
    let request: DeleteRequest = parse_json_body(&body)?;
    let id = required_id(request.id).ok_or(ApiError::BadRequest(DELETE_ID_REQUIRED))?;

    let deleted = state
        .row_store
        .delete_record(&id)
        .await
        .map_err(|err| ApiError::upstream(GENERIC_FAILURE, err))?;
    tracing::info!("testimonial {} deleted", deleted.id);

    Ok(Json(DeleteResponse {
        success: true,
        message: "Testimonial deleted successfully".to_string(),
        deleted_id: deleted.id,
    }))
}
