use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Rating reported for a row whose `rating` cell is empty.
pub const DEFAULT_RATING: f64 = 5.0;
/// Display-only status label attached to rows in the moderation queue.
pub const PENDING_STATUS_LABEL: &str = "pending";

/// Cells of one testimonial row as the hosted table stores them.
///
/// Every cell is optional because the table is edited by hand as well; the
/// classification helpers on [`TestimonialRecord`] decide what a row means.
/// A cell holding an unexpected type decodes as empty instead of failing the
/// whole row, and a rating typed as text is parsed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestimonialFields {
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(
        default,
        rename = "approvedAt",
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub approved_at: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// One row returned by the row store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestimonialRecord {
    pub id: String,
    #[serde(rename = "createdTime", default)]
    pub created_time: String,
    #[serde(default)]
    pub fields: TestimonialFields,
}

/// Moderation state of a row, derived from which cells are filled in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestimonialStatus {
    /// `name` or `message` is missing; the row is neither listed nor shown.
    Incomplete,
    /// Awaiting moderation.
    Pending,
    /// Approved on the given date and eligible for display.
    Approved { approved_at: String },
}

impl TestimonialRecord {
    pub fn status(&self) -> TestimonialStatus {
        let fields = &self.fields;
        if !has_text(fields.name.as_deref()) || !has_text(fields.message.as_deref()) {
            return TestimonialStatus::Incomplete;
        }
        match fields.approved_at.as_deref() {
            Some(approved_at) if !approved_at.is_empty() => TestimonialStatus::Approved {
                approved_at: approved_at.to_string(),
            },
            _ => TestimonialStatus::Pending,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status() == TestimonialStatus::Pending
    }

    /// Approved rows additionally need a non-zero rating to be shown.
    pub fn is_visible(&self) -> bool {
        matches!(self.status(), TestimonialStatus::Approved { .. })
            && self
                .fields
                .rating
                .is_some_and(|rating| rating != 0.0 && !rating.is_nan())
    }

    pub fn to_public(&self) -> Option<PublicTestimonial> {
        if !self.is_visible() {
            return None;
        }
        let fields = &self.fields;
        Some(PublicTestimonial {
            id: self.id.clone(),
            name: fields.name.clone().unwrap_or_default(),
            company: fields.company.clone().unwrap_or_default(),
            message: fields.message.clone().unwrap_or_default(),
            rating: fields.rating.unwrap_or(DEFAULT_RATING),
            approved_at: fields.approved_at.clone().unwrap_or_default(),
        })
    }

    pub fn to_pending(&self) -> Option<PendingTestimonial> {
        if !self.is_pending() {
            return None;
        }
        let fields = &self.fields;
        Some(PendingTestimonial {
            id: self.id.clone(),
            created_time: self.created_time.clone(),
            fields: PendingFields {
                name: fields.name.clone().unwrap_or_default(),
                email: fields.email.clone(),
                company: fields.company.clone().unwrap_or_default(),
                message: fields.message.clone().unwrap_or_default(),
                rating: fields
                    .rating
                    .filter(|rating| *rating != 0.0 && !rating.is_nan())
                    .unwrap_or(DEFAULT_RATING),
                status: fields
                    .status
                    .clone()
                    .filter(|status| !status.is_empty())
                    .unwrap_or_else(|| PENDING_STATUS_LABEL.to_string()),
            },
        })
    }
}

/// Public shape served to the carousel. Email is never included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicTestimonial {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub company: String,
    pub message: String,
    pub rating: f64,
    #[serde(rename = "approvedAt")]
    pub approved_at: String,
}

/// Moderation queue entry; keeps the email so the moderator can follow up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingTestimonial {
    pub id: String,
    #[serde(rename = "createdTime")]
    pub created_time: String,
    pub fields: PendingFields,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingFields {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub company: String,
    pub message: String,
    pub rating: f64,
    pub status: String,
}

/// The five sanitized cells written when a submission is accepted.
///
/// There is intentionally no status or date cell here: a new row is pending
/// until a moderator fills in `approvedAt`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTestimonial {
    pub name: String,
    pub email: String,
    pub company: String,
    pub message: String,
    pub rating: u8,
}

/// Sort newest approval first. Rows whose date cannot be parsed go last and
/// otherwise keep their relative order.
pub fn sort_newest_approved_first(items: &mut [PublicTestimonial]) {
    items.sort_by(|left, right| {
        approval_instant(&right.approved_at).cmp(&approval_instant(&left.approved_at))
    });
}

/// Parse an `approvedAt` cell, accepting either a plain date or an RFC 3339
/// timestamp.
pub fn approval_instant(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|value| value.naive_utc())
}

/// Text cell: strings as-is, numbers in their JSON form, multi-select lists
/// joined with `", "`. Anything else is treated as empty.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => Some(text),
        Value::Number(number) => Some(number.to_string()),
        Value::Array(items) => {
            let parts: Vec<String> = items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(text) => Some(text),
                    _ => None,
                })
                .collect();
            (!parts.is_empty()).then(|| parts.join(", "))
        },
        _ => None,
    })
}

/// Numeric cell: numbers, or text that parses as a finite number.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let number = match Value::deserialize(deserializer)? {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(number.filter(|value| value.is_finite()))
}

fn has_text(value: Option<&str>) -> bool {
    value.is_some_and(|text| !text.is_empty())
}
