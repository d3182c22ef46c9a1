//! Pure pieces of the testimonial carousel: de-duplication, star glyphs and
//! the `current/total` counter.

use std::collections::HashSet;

use crate::testimonial::PublicTestimonial;

/// Every rating renders as exactly this many glyphs.
pub const STAR_SLOTS: usize = 5;

/// Keep the first testimonial for each message, comparing trimmed and
/// lowercased text.
pub fn dedupe_by_message(items: Vec<PublicTestimonial>) -> Vec<PublicTestimonial> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(message_key(&item.message)))
        .collect()
}

pub fn message_key(message: &str) -> String {
    message.trim().to_lowercase()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StarGlyph {
    Full,
    Half,
    Empty,
}

impl StarGlyph {
    pub fn css_class(self) -> &'static str {
        match self {
            StarGlyph::Full => "fa fa-star",
            StarGlyph::Half => "fa fa-star-half-o",
            StarGlyph::Empty => "fa fa-star-o",
        }
    }
}

/// Floor of the rating as full stars, one half star when the fraction is at
/// least 0.5, empty stars for the rest.
pub fn star_glyphs(rating: f64) -> Vec<StarGlyph> {
    let rating = if rating.is_nan() { 0.0 } else { rating.clamp(0.0, STAR_SLOTS as f64) };
    let full = rating.floor() as usize;
    let half = usize::from(rating.fract() >= 0.5);
    let empty = STAR_SLOTS - full - half;

    let mut glyphs = Vec::with_capacity(STAR_SLOTS);
    glyphs.extend(std::iter::repeat(StarGlyph::Full).take(full));
    glyphs.extend(std::iter::repeat(StarGlyph::Half).take(half));
    glyphs.extend(std::iter::repeat(StarGlyph::Empty).take(empty));
    glyphs
}

/// Looping slide position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CarouselPosition {
    index: usize,
    total: usize,
}

impl CarouselPosition {
    pub fn new(total: usize) -> Self {
        Self {
            index: 0,
            total,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn next(self) -> Self {
        self.go_to(self.index + 1)
    }

    pub fn prev(self) -> Self {
        if self.total == 0 {
            return self;
        }
        self.go_to(self.index + self.total - 1)
    }

    pub fn go_to(self, index: usize) -> Self {
        if self.total == 0 {
            return self;
        }
        Self {
            index: index % self.total,
            total: self.total,
        }
    }

    /// One-based counter text, e.g. `2/5`.
    pub fn label(&self) -> String {
        if self.total == 0 {
            return "0/0".to_string();
        }
        format!("{}/{}", self.index + 1, self.total)
    }
}
