//! State machine behind the "Share Your Experience" dialog.
//!
//! `Closed → Open → Submitting → Open` (with a success notice, then closed by
//! a timer) or back to `Open` with an error notice. The view only renders a
//! [`ModalState`] and feeds [`ModalAction`]s back in.

use std::collections::BTreeMap;

use crate::{
    testimonial::NewTestimonial,
    validation::{check_text, Field, MAX_RATING, MIN_RATING},
};

pub const RATING_REQUIRED_MESSAGE: &str = "Please select a rating";
pub const RATE_LIMITED_MESSAGE: &str =
    "You have submitted too many testimonials recently. Please try again later.";
pub const DEFAULT_SUCCESS_MESSAGE: &str =
    "Thank you! Your testimonial has been submitted for review.";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ModalPhase {
    #[default]
    Closed,
    Open,
    Submitting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// Banner above the form. `seq` identifies it so a delayed dismissal only
/// clears the banner it was scheduled for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
    pub mailto: Option<String>,
    pub seq: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValues {
    pub name: String,
    pub email: String,
    pub company: String,
    pub message: String,
}

impl FormValues {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Email => &self.email,
            Field::Company => &self.company,
            Field::Message => &self.message,
            Field::Rating => "",
        }
    }

    fn set(&mut self, field: Field, value: String) {
        match field {
            Field::Name => self.name = value,
            Field::Email => self.email = value,
            Field::Company => self.company = value,
            Field::Message => self.message = value,
            Field::Rating => {},
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalAction {
    /// Open the dialog; `rate_limited` shows the limit notice straight away.
    Open { rate_limited: bool },
    Close,
    Input { field: Field, value: String },
    Blur(Field),
    SelectRating(u8),
    HoverRating(Option<u8>),
    Submit,
    RateLimited,
    /// Outcome of the request started in `session`; ignored once that
    /// session has been closed.
    SubmitSucceeded { session: u32, message: String },
    SubmitFailed {
        session: u32,
        message: String,
        mailto: Option<String>,
    },
    /// Timer-driven close after success; ignored if the dialog was reopened.
    AutoClose { session: u32 },
    DismissNotice { seq: u32 },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModalState {
    pub phase: ModalPhase,
    /// Incremented on every open.
    pub session: u32,
    pub values: FormValues,
    pub field_errors: BTreeMap<Field, &'static str>,
    pub rating: u8,
    pub hover_rating: Option<u8>,
    pub notice: Option<Notice>,
    /// Set once the current session's submission was accepted.
    pub submitted: bool,
    /// The browser-side limit refused this session; the form is read-only
    /// and the limit notice stays up until the dialog closes.
    pub locked: bool,
    notice_seq: u32,
}

impl ModalState {
    pub fn is_open(&self) -> bool {
        self.phase != ModalPhase::Closed
    }

    pub fn is_submitting(&self) -> bool {
        self.phase == ModalPhase::Submitting
    }

    /// Stars lit in the selector: the hovered value wins over the chosen one.
    pub fn displayed_rating(&self) -> u8 {
        self.hover_rating.unwrap_or(self.rating)
    }

    /// Fields and stars accept input.
    pub fn is_editable(&self) -> bool {
        self.phase == ModalPhase::Open && !self.submitted && !self.locked
    }

    /// True when a `Submit` would move the dialog into `Submitting`.
    pub fn ready_to_submit(&self) -> bool {
        self.is_editable() && self.form_errors().is_empty() && self.rating != 0
    }

    /// Body posted to the submission endpoint.
    pub fn payload(&self) -> NewTestimonial {
        NewTestimonial {
            name: self.values.name.trim().to_string(),
            email: self.values.email.trim().to_string(),
            company: self.values.company.trim().to_string(),
            message: self.values.message.trim().to_string(),
            rating: self.rating,
        }
    }

    pub fn apply(&self, action: ModalAction) -> ModalState {
        let mut next = self.clone();
        match action {
            ModalAction::Open { rate_limited } => {
                if self.is_open() {
                    return next;
                }
                next = self.closed();
                next.phase = ModalPhase::Open;
                next.session = self.session.wrapping_add(1);
                if rate_limited {
                    next.locked = true;
                    next.set_notice(NoticeKind::Error, RATE_LIMITED_MESSAGE, None);
                }
            },
            ModalAction::Close => next = self.closed(),
            ModalAction::Input { field, value } => {
                if self.is_editable() {
                    next.values.set(field, value);
                    next.field_errors.remove(&field);
                }
            },
            ModalAction::Blur(field) => {
                if self.is_editable() {
                    match check_text(field, self.values.get(field)) {
                        Some(error) => {
                            next.field_errors.insert(field, error.field_message());
                        },
                        None => {
                            next.field_errors.remove(&field);
                        },
                    }
                }
            },
            ModalAction::SelectRating(rating) => {
                if self.is_editable() {
                    next.rating = clamp_rating(rating);
                    next.hover_rating = None;
                }
            },
            ModalAction::HoverRating(rating) => {
                if self.is_editable() {
                    next.hover_rating = rating.map(clamp_rating);
                }
            },
            ModalAction::Submit => {
                if !self.is_editable() {
                    return next;
                }
                next.field_errors = self.form_errors();
                if self.rating == 0 {
                    next.set_notice(NoticeKind::Error, RATING_REQUIRED_MESSAGE, None);
                }
                if next.field_errors.is_empty() && self.rating != 0 {
                    next.phase = ModalPhase::Submitting;
                    next.notice = None;
                }
            },
            ModalAction::RateLimited => {
                if self.is_open() {
                    next.phase = ModalPhase::Open;
                    next.locked = true;
                    next.hover_rating = None;
                    next.set_notice(NoticeKind::Error, RATE_LIMITED_MESSAGE, None);
                }
            },
            ModalAction::SubmitSucceeded { session, message } => {
                if self.is_submitting() && self.session == session {
                    let text = if message.trim().is_empty() {
                        DEFAULT_SUCCESS_MESSAGE.to_string()
                    } else {
                        message
                    };
                    next.phase = ModalPhase::Open;
                    next.submitted = true;
                    next.values = FormValues::default();
                    next.field_errors.clear();
                    next.rating = 0;
                    next.hover_rating = None;
                    next.set_notice(NoticeKind::Success, &text, None);
                }
            },
            ModalAction::SubmitFailed {
                session,
                message,
                mailto,
            } => {
                if self.is_submitting() && self.session == session {
                    next.phase = ModalPhase::Open;
                    next.set_notice(NoticeKind::Error, &message, mailto);
                }
            },
            ModalAction::AutoClose { session } => {
                if self.is_open() && self.session == session {
                    next = self.closed();
                }
            },
            ModalAction::DismissNotice { seq } => {
                if !self.locked && self.notice.as_ref().is_some_and(|notice| notice.seq == seq) {
                    next.notice = None;
                }
            },
        }
        next
    }

    /// Seq of the banner currently shown, for scheduling its dismissal.
    pub fn notice_seq(&self) -> Option<u32> {
        self.notice.as_ref().map(|notice| notice.seq)
    }

    fn form_errors(&self) -> BTreeMap<Field, &'static str> {
        Field::TEXT_FIELDS
            .iter()
            .filter_map(|field| {
                check_text(*field, self.values.get(*field)).map(|error| (*field, error.field_message()))
            })
            .collect()
    }

    fn closed(&self) -> ModalState {
        ModalState {
            session: self.session,
            notice_seq: self.notice_seq,
            ..ModalState::default()
        }
    }

    fn set_notice(&mut self, kind: NoticeKind, text: &str, mailto: Option<String>) {
        self.notice_seq = self.notice_seq.wrapping_add(1);
        self.notice = Some(Notice {
            kind,
            text: text.to_string(),
            mailto,
            seq: self.notice_seq,
        });
    }
}

fn clamp_rating(rating: u8) -> u8 {
    let min = u8::try_from(MIN_RATING).unwrap_or(1);
    let max = u8::try_from(MAX_RATING).unwrap_or(5);
    rating.clamp(min, max)
}

/// `mailto:` link carrying the form contents, offered when the submission
/// endpoint stays unreachable.
pub fn fallback_mailto(contact: &str, values: &FormValues, rating: u8) -> String {
    let subject = format!("Testimonial from {}", values.name.trim());
    let body = format!(
        "Name: {}\nEmail: {}\nCompany/Title: {}\nRating: {}/5\n\n{}",
        values.name.trim(),
        values.email.trim(),
        values.company.trim(),
        rating,
        values.message.trim()
    );
    format!(
        "mailto:{}?subject={}&body={}",
        contact,
        urlencoding::encode(&subject),
        urlencoding::encode(&body)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open() -> ModalState {
        ModalState::default().apply(ModalAction::Open {
            rate_limited: false,
        })
    }

    fn filled() -> ModalState {
        let mut state = open();
        for (field, value) in [
            (Field::Name, "Grace"),
            (Field::Email, "grace@example.com"),
            (Field::Company, "Navy Labs"),
            (Field::Message, "Clear communication and great results."),
        ] {
            state = state.apply(ModalAction::Input {
                field,
                value: value.to_string(),
            });
        }
        state.apply(ModalAction::SelectRating(5))
    }

    #[test]
    fn opening_starts_a_new_session() {
        let state = open();
        assert_eq!(state.phase, ModalPhase::Open);
        assert_eq!(state.session, 1);
        assert!(state.notice.is_none());
    }

    #[test]
    fn blur_sets_and_typing_clears_field_error() {
        let state = open()
            .apply(ModalAction::Input {
                field: Field::Name,
                value: "G".to_string(),
            })
            .apply(ModalAction::Blur(Field::Name));
        assert_eq!(
            state.field_errors.get(&Field::Name),
            Some(&"Name must be at least 2 characters long")
        );
        let state = state.apply(ModalAction::Input {
            field: Field::Name,
            value: "Gr".to_string(),
        });
        assert!(state.field_errors.is_empty());
    }

    #[test]
    fn submit_without_rating_stays_open_with_notice() {
        let state = filled();
        let mut unrated = state.clone();
        unrated.rating = 0;
        assert!(!unrated.ready_to_submit());
        let after = unrated.apply(ModalAction::Submit);
        assert_eq!(after.phase, ModalPhase::Open);
        assert_eq!(
            after.notice.as_ref().map(|notice| notice.text.as_str()),
            Some(RATING_REQUIRED_MESSAGE)
        );
    }

    #[test]
    fn submit_with_invalid_fields_marks_every_field() {
        let after = open().apply(ModalAction::SelectRating(4)).apply(ModalAction::Submit);
        assert_eq!(after.phase, ModalPhase::Open);
        assert_eq!(after.field_errors.len(), 4);
    }

    #[test]
    fn valid_form_moves_to_submitting_and_blocks_duplicates() {
        let state = filled();
        assert!(state.ready_to_submit());
        let submitting = state.apply(ModalAction::Submit);
        assert!(submitting.is_submitting());
        assert!(!submitting.ready_to_submit());
        assert_eq!(submitting.apply(ModalAction::Submit), submitting);
        assert_eq!(submitting.payload().rating, 5);
    }

    #[test]
    fn success_clears_form_and_auto_close_only_hits_same_session() {
        let submitting = filled().apply(ModalAction::Submit);
        let done = submitting.apply(ModalAction::SubmitSucceeded {
            session: submitting.session,
            message: String::new(),
        });
        assert_eq!(done.phase, ModalPhase::Open);
        assert!(done.submitted);
        assert_eq!(done.values, FormValues::default());
        assert_eq!(
            done.notice.as_ref().map(|notice| notice.kind),
            Some(NoticeKind::Success)
        );
        assert_eq!(
            done.notice.as_ref().map(|notice| notice.text.as_str()),
            Some(DEFAULT_SUCCESS_MESSAGE)
        );

        let reopened = done.apply(ModalAction::Close).apply(ModalAction::Open {
            rate_limited: false,
        });
        let stale_close = reopened.apply(ModalAction::AutoClose {
            session: done.session,
        });
        assert!(stale_close.is_open());
        assert!(!done
            .apply(ModalAction::AutoClose {
                session: done.session
            })
            .is_open());
    }

    #[test]
    fn failure_returns_to_open_with_fallback_link() {
        let submitting = filled().apply(ModalAction::Submit);
        let failed = submitting.apply(ModalAction::SubmitFailed {
            session: submitting.session,
            message: "Network error".to_string(),
            mailto: Some("mailto:me@example.com".to_string()),
        });
        assert_eq!(failed.phase, ModalPhase::Open);
        assert_eq!(failed.values.name, "Grace");
        let notice = failed.notice.clone().expect("error notice");
        assert_eq!(notice.kind, NoticeKind::Error);
        assert_eq!(notice.mailto.as_deref(), Some("mailto:me@example.com"));

        let dismissed = failed.apply(ModalAction::DismissNotice { seq: notice.seq });
        assert!(dismissed.notice.is_none());
        assert_eq!(
            failed.apply(ModalAction::DismissNotice { seq: notice.seq + 1 }),
            failed
        );
    }

    #[test]
    fn close_resets_errors_rating_and_submitting_flag() {
        let state = filled()
            .apply(ModalAction::Blur(Field::Email))
            .apply(ModalAction::HoverRating(Some(2)))
            .apply(ModalAction::Submit)
            .apply(ModalAction::Close);
        assert_eq!(state.phase, ModalPhase::Closed);
        assert_eq!(state.rating, 0);
        assert_eq!(state.displayed_rating(), 0);
        assert!(state.field_errors.is_empty());
        assert!(!state.is_submitting());
        let late = state.apply(ModalAction::SubmitSucceeded {
            session: state.session,
            message: "late".to_string(),
        });
        assert_eq!(late, state);
    }

    #[test]
    fn rate_limited_open_shows_notice_and_locks_the_form() {
        let state = ModalState::default().apply(ModalAction::Open { rate_limited: true });
        let notice = state.notice.clone().expect("limit notice");
        assert_eq!(notice.text, RATE_LIMITED_MESSAGE);
        assert!(state.locked);
        assert!(!state.is_editable());

        let typed = state
            .apply(ModalAction::Input {
                field: Field::Name,
                value: "Grace".to_string(),
            })
            .apply(ModalAction::SelectRating(5))
            .apply(ModalAction::Submit);
        assert_eq!(typed, state);
        assert_eq!(state.apply(ModalAction::DismissNotice { seq: notice.seq }), state);

        let reopened = state.apply(ModalAction::Close).apply(ModalAction::Open {
            rate_limited: false,
        });
        assert!(!reopened.locked);
        assert!(reopened.is_editable());
    }

    #[test]
    fn limit_hit_on_submit_locks_a_filled_form() {
        let state = filled().apply(ModalAction::RateLimited);
        assert!(state.locked);
        assert!(!state.ready_to_submit());
        assert_eq!(state.values.name, "Grace");
        assert!(!state.apply(ModalAction::Submit).is_submitting());
    }

    #[test]
    fn payload_trims_text_fields() {
        let state = filled().apply(ModalAction::Input {
            field: Field::Email,
            value: "  grace@example.com ".to_string(),
        });
        assert!(state.ready_to_submit());
        let payload = state.payload();
        assert_eq!(payload.email, "grace@example.com");
        assert_eq!(payload.name, "Grace");
    }

    #[test]
    fn result_from_a_closed_session_is_ignored() {
        let first = filled().apply(ModalAction::Submit);
        let reopened = first.apply(ModalAction::Close).apply(ModalAction::Open {
            rate_limited: false,
        });
        let mut state = reopened;
        for (field, value) in [
            (Field::Name, "Hopper"),
            (Field::Email, "hopper@example.com"),
            (Field::Company, "Navy Labs"),
            (Field::Message, "Second attempt after reopening."),
        ] {
            state = state.apply(ModalAction::Input {
                field,
                value: value.to_string(),
            });
        }
        let submitting = state.apply(ModalAction::SelectRating(4)).apply(ModalAction::Submit);
        assert!(submitting.is_submitting());

        let stale = submitting.apply(ModalAction::SubmitFailed {
            session: first.session,
            message: "Network error".to_string(),
            mailto: None,
        });
        assert_eq!(stale, submitting);

        let current = submitting.apply(ModalAction::SubmitSucceeded {
            session: submitting.session,
            message: "ok".to_string(),
        });
        assert!(current.submitted);
    }

    #[test]
    fn hover_previews_without_changing_selection() {
        let state = open()
            .apply(ModalAction::SelectRating(3))
            .apply(ModalAction::HoverRating(Some(5)));
        assert_eq!(state.displayed_rating(), 5);
        assert_eq!(state.apply(ModalAction::HoverRating(None)).displayed_rating(), 3);
    }

    #[test]
    fn mailto_link_is_percent_encoded() {
        let values = FormValues {
            name: "Jo Doe".to_string(),
            email: "jo@example.com".to_string(),
            company: "A&B".to_string(),
            message: "Fantastic!".to_string(),
        };
        let link = fallback_mailto("me@example.com", &values, 4);
        assert!(link.starts_with("mailto:me@example.com?subject=Testimonial%20from%20Jo%20Doe&body="));
        assert!(link.contains("A%26B"));
        assert!(link.contains("Rating%3A%204%2F5"));
    }
}
