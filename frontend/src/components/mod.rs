pub mod star_rating;
pub mod testimonial_carousel;
pub mod testimonial_modal;
