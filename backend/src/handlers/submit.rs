use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use folio_shared::{api::SubmitResponse, validate_submission, RawSubmission};

use super::parse_json_body;
use crate::{
    client_ip::extract_client_ip,
    error::{ApiError, GENERIC_SUBMIT_FAILURE},
    rate_limit::RateDecision,
    state::AppState,
};

pub const SUBMIT_SUCCESS_MESSAGE: &str =
    "Testimonial submitted successfully! We'll review it and get back to you.";

/// `POST submit-testimonial`: rate limit, validate, then insert one pending row.
///
/// The attempt counts against the limit even when validation later fails.
pub async fn submit_testimonial(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<SubmitResponse>), ApiError> {
    let client_ip = extract_client_ip(&headers);
    if let RateDecision::Denied { retry_after_secs } = state.rate_limiter.check(&client_ip).await {
        return Err(ApiError::RateLimited {
            retry_after: retry_after_secs,
        });
    }

    let raw: RawSubmission = parse_json_body(&body)?;
    let row = validate_submission(&raw).map_err(|errors| {
        ApiError::Validation(errors.iter().map(ToString::to_string).collect())
    })?;

    let record = state
        .row_store
        .create_record(&row)
        .await
        .map_err(|err| ApiError::upstream(GENERIC_SUBMIT_FAILURE, err))?;
    tracing::info!("testimonial {} submitted and awaiting review", record.id);

    if let Some(notifier) = &state.notifier {
        notifier.spawn_notify(row, record.id);
    }

    Ok((
        StatusCode::CREATED,
        Json(SubmitResponse {
            success: true,
            message: SUBMIT_SUCCESS_MESSAGE.to_string(),
        }),
    ))
}
