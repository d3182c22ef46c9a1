use axum::{extract::State, Json};
use chrono::{SecondsFormat, Utc};
use folio_shared::{
    api::PublicListResponse, testimonial::sort_newest_approved_first, PublicTestimonial,
    TestimonialRecord,
};

use crate::{row_store::LIST_LIMIT, state::AppState};

/// `GET get-testimonials`. Never fails: a row store error is logged and
/// served as an empty list so the page still renders.
pub async fn list_testimonials(State(state): State<AppState>) -> Json<PublicListResponse> {
    let testimonials = match state.row_store.list_records(Some(LIST_LIMIT)).await {
        Ok(records) => visible_testimonials(&records),
        Err(err) => {
            tracing::error!("failed to load testimonials, serving an empty list: {err}");
            Vec::new()
        },
    };

    Json(PublicListResponse {
        count: testimonials.len(),
        testimonials,
        last_updated: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}

/// Approved rows in public shape, newest approval first.
pub fn visible_testimonials(records: &[TestimonialRecord]) -> Vec<PublicTestimonial> {
    let mut visible: Vec<PublicTestimonial> =
        records.iter().filter_map(TestimonialRecord::to_public).collect();
    sort_newest_approved_first(&mut visible);
    visible
}
