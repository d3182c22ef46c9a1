mod api;
mod components;
mod config;
mod loader;
mod log;
mod owl;
mod storage;

use components::testimonial_modal::TestimonialSubmission;

fn main() {
    mount_submission_button();
    wasm_bindgen_futures::spawn_local(loader::load_testimonials());
}

/// Appends the "Share Your Experience" widget to the testimonials section.
fn mount_submission_button() {
    let Some(document) = web_sys::window().and_then(|window| window.document()) else {
        return;
    };
    let Some(section) = document.get_element_by_id(config::SECTION_ID) else {
        log::warn(&format!("#{} not found, submission form disabled", config::SECTION_ID));
        return;
    };
    let Ok(container) = document.create_element("div") else {
        return;
    };
    container.set_class_name("text-center testimonial-submit-container");
    if section.append_child(&container).is_err() {
        return;
    }
    yew::Renderer::<TestimonialSubmission>::with_root(container).render();
}
