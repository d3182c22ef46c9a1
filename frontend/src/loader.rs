//! Replaces the static carousel markup with the approved testimonials.

use folio_shared::display::dedupe_by_message;
use gloo_timers::future::TimeoutFuture;

use crate::{
    api,
    components::testimonial_carousel::{TestimonialCarousel, TestimonialCarouselProps},
    config::{CAROUSEL_HOST_ID, LOAD_DELAY_MS},
    log, owl,
};

/// Runs once per page load. Any failure leaves the existing markup in place.
pub async fn load_testimonials() {
    TimeoutFuture::new(LOAD_DELAY_MS).await;

    let testimonials = match api::fetch_testimonials().await {
        Ok(items) => dedupe_by_message(items),
        Err(err) => {
            log::error(&format!("failed to load testimonials, keeping static content: {err}"));
            return;
        },
    };
    if testimonials.is_empty() {
        log::info("no approved testimonials yet, keeping static content");
        return;
    }

    let Some(host) = web_sys::window()
        .and_then(|window| window.document())
        .and_then(|document| document.get_element_by_id(CAROUSEL_HOST_ID))
    else {
        log::warn(&format!("#{CAROUSEL_HOST_ID} not found"));
        return;
    };

    if owl::destroy_carousel(&host) {
        log::info("stopped the static owl carousel");
    }
    log::info(&format!("rendering {} testimonials", testimonials.len()));
    host.set_inner_html("");
    yew::Renderer::<TestimonialCarousel>::with_root_and_props(
        host,
        TestimonialCarouselProps { testimonials },
    )
    .render();
}
