//! Submission rules, applied by the server before a row is written and by the
//! browser form on blur.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::testimonial::NewTestimonial;

pub const MIN_NAME_CHARS: usize = 2;
pub const MIN_COMPANY_CHARS: usize = 2;
pub const MIN_MESSAGE_CHARS: usize = 10;
pub const MAX_EMAIL_CHARS: usize = 254;
/// Every free-text cell is cut to this many characters after sanitizing.
pub const MAX_TEXT_CHARS: usize = 500;
pub const MIN_RATING: i64 = 1;
pub const MAX_RATING: i64 = 5;

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));

/// Form fields in the order the rules are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Name,
    Email,
    Message,
    Company,
    Rating,
}

impl Field {
    pub const TEXT_FIELDS: [Field; 4] = [Field::Name, Field::Email, Field::Company, Field::Message];

    pub fn as_str(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::Message => "message",
            Field::Company => "company",
            Field::Rating => "rating",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One violated rule. `Display` is the server wording returned in `details`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Name must be at least 2 characters long")]
    NameTooShort,
    #[error("Valid email address is required")]
    InvalidEmail,
    #[error("Testimonial message must be at least 10 characters long")]
    MessageTooShort,
    #[error("Company/Title must be at least 2 characters long")]
    CompanyTooShort,
    #[error("Rating must be between 1 and 5")]
    RatingOutOfRange,
}

impl ValidationError {
    pub fn field(self) -> Field {
        match self {
            ValidationError::NameTooShort => Field::Name,
            ValidationError::InvalidEmail => Field::Email,
            ValidationError::MessageTooShort => Field::Message,
            ValidationError::CompanyTooShort => Field::Company,
            ValidationError::RatingOutOfRange => Field::Rating,
        }
    }

    /// Inline text shown under the offending input in the browser form.
    pub fn field_message(self) -> &'static str {
        match self {
            ValidationError::NameTooShort => "Name must be at least 2 characters long",
            ValidationError::InvalidEmail => "Please enter a valid email address",
            ValidationError::MessageTooShort => "Testimonial must be at least 10 characters long",
            ValidationError::CompanyTooShort => "Company/Title must be at least 2 characters long",
            ValidationError::RatingOutOfRange => "Please select a rating",
        }
    }
}

/// Submission body as received. Cells are kept as raw JSON so that a
/// wrong-typed value becomes a rule violation rather than a decode failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSubmission {
    #[serde(default)]
    pub name: Option<Value>,
    #[serde(default)]
    pub email: Option<Value>,
    #[serde(default)]
    pub company: Option<Value>,
    #[serde(default)]
    pub message: Option<Value>,
    #[serde(default)]
    pub rating: Option<Value>,
}

/// Check every rule and return either the sanitized row or all violations in
/// rule order. There is no partial success.
pub fn validate_submission(raw: &RawSubmission) -> Result<NewTestimonial, Vec<ValidationError>> {
    let name = as_text(raw.name.as_ref());
    let email = as_text(raw.email.as_ref());
    let company = as_text(raw.company.as_ref());
    let message = as_text(raw.message.as_ref());
    let rating = raw.rating.as_ref().and_then(parse_rating);

    let mut errors = Vec::new();
    if let Some(error) = check_text(Field::Name, name.unwrap_or_default()) {
        errors.push(error);
    }
    if !email.is_some_and(is_valid_email) {
        errors.push(ValidationError::InvalidEmail);
    }
    if let Some(error) = check_text(Field::Message, message.unwrap_or_default()) {
        errors.push(error);
    }
    if let Some(error) = check_text(Field::Company, company.unwrap_or_default()) {
        errors.push(error);
    }
    let rating = match rating.filter(|value| (MIN_RATING..=MAX_RATING).contains(value)) {
        Some(value) => value,
        None => {
            errors.push(ValidationError::RatingOutOfRange);
            0
        },
    };

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(NewTestimonial {
        name: sanitize_text(name.unwrap_or_default()),
        email: sanitize_text(email.unwrap_or_default()),
        company: sanitize_text(company.unwrap_or_default()),
        message: sanitize_text(message.unwrap_or_default()),
        rating: u8::try_from(rating).unwrap_or_default(),
    })
}

/// Rule check for a single text field, used on blur in the browser.
pub fn check_text(field: Field, value: &str) -> Option<ValidationError> {
    let trimmed_chars = value.trim().chars().count();
    match field {
        Field::Name if trimmed_chars < MIN_NAME_CHARS => Some(ValidationError::NameTooShort),
        Field::Company if trimmed_chars < MIN_COMPANY_CHARS => {
            Some(ValidationError::CompanyTooShort)
        },
        Field::Message if trimmed_chars < MIN_MESSAGE_CHARS => {
            Some(ValidationError::MessageTooShort)
        },
        Field::Email if !is_valid_email(value.trim()) => Some(ValidationError::InvalidEmail),
        _ => None,
    }
}

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_PATTERN.is_match(value) && value.chars().count() <= MAX_EMAIL_CHARS
}

/// Trim, drop angle brackets and cut to [`MAX_TEXT_CHARS`].
pub fn sanitize_text(value: &str) -> String {
    value
        .trim()
        .chars()
        .filter(|ch| *ch != '<' && *ch != '>')
        .take(MAX_TEXT_CHARS)
        .collect()
}

/// Integer prefix parse: `5`, `"4"`, `" 3 stars"` and `4.7` are accepted and
/// truncated; anything else yields `None`.
pub fn parse_rating(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().filter(|raw| raw.is_finite()).map(|raw| raw.trunc() as i64)),
        Value::String(raw) => parse_leading_integer(raw),
        _ => None,
    }
}

fn parse_leading_integer(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let end = digits
        .find(|ch: char| !ch.is_ascii_digit())
        .unwrap_or(digits.len());
    let magnitude: i64 = digits[..end].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

fn as_text(value: Option<&Value>) -> Option<&str> {
    match value {
        Some(Value::String(text)) => Some(text.as_str()),
        _ => None,
    }
}
