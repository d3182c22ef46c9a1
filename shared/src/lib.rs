//! Testimonial model and pure UI/validation logic shared by the folio
//! backend and the wasm frontend.

pub mod api;
pub mod display;
pub mod modal;
pub mod rate_window;
pub mod retry;
pub mod testimonial;
pub mod validation;

pub use testimonial::{
    NewTestimonial, PendingTestimonial, PublicTestimonial, TestimonialFields, TestimonialRecord,
    TestimonialStatus,
};
pub use validation::{validate_submission, Field, RawSubmission, ValidationError};
