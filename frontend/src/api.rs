use folio_shared::{
    api::{ErrorBody, PublicListResponse, SubmitResponse},
    retry::{run_with_retry, RequestFailure, RetryPolicy},
    NewTestimonial, PublicTestimonial,
};
use gloo_net::http::{Request, Response};
use gloo_timers::future::TimeoutFuture;
use js_sys::Date;
use web_sys::RequestCache;

use crate::{config::endpoint, log};

/// Approved testimonials, bypassing every cache between here and the row store.
pub async fn fetch_testimonials() -> Result<Vec<PublicTestimonial>, RequestFailure> {
    let url = format!("{}?_ts={}", endpoint("get-testimonials"), Date::now() as u64);
    let response = Request::get(&url)
        .cache(RequestCache::NoStore)
        .header("Cache-Control", "no-cache, no-store, must-revalidate")
        .header("Pragma", "no-cache")
        .send()
        .await
        .map_err(|e| RequestFailure::Network(e.to_string()))?;

    if !response.ok() {
        return Err(failure_from(response).await);
    }

    let body: PublicListResponse = response
        .json()
        .await
        .map_err(|e| RequestFailure::Decode(e.to_string()))?;
    Ok(body.testimonials)
}

/// One submission attempt, no retry.
pub async fn post_submission(payload: &NewTestimonial) -> Result<SubmitResponse, RequestFailure> {
    let response = Request::post(&endpoint("submit-testimonial"))
        .json(payload)
        .map_err(|e| RequestFailure::Decode(e.to_string()))?
        .send()
        .await
        .map_err(|e| RequestFailure::Network(e.to_string()))?;

    if !response.ok() {
        return Err(failure_from(response).await);
    }

    response
        .json()
        .await
        .map_err(|e| RequestFailure::Decode(e.to_string()))
}

/// Submit with bounded retry on server errors and network failures.
pub async fn submit_testimonial(payload: NewTestimonial) -> Result<SubmitResponse, RequestFailure> {
    run_with_retry(
        RetryPolicy::default(),
        || {
            let payload = payload.clone();
            async move { post_submission(&payload).await }
        },
        |delay_ms| {
            log::warn(&format!("submission failed, retrying in {delay_ms}ms"));
            TimeoutFuture::new(delay_ms)
        },
    )
    .await
}

/// Error status plus the most useful message the body offers.
async fn failure_from(response: Response) -> RequestFailure {
    let status = response.status();
    let message = match response.json::<ErrorBody>().await {
        Ok(body) => match body.details {
            Some(details) if !details.is_empty() => details.join(". "),
            _ => body.error,
        },
        Err(_) => format!("HTTP {status}"),
    };
    RequestFailure::Status { status, message }
}
