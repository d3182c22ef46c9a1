//! "Share Your Experience" button and the submission dialog behind it.
//!
//! All state transitions live in [`folio_shared::modal`]; this component only
//! renders [`ModalState`] and wires DOM events and timers to actions.

use std::rc::Rc;

use folio_shared::{
    modal::{fallback_mailto, ModalAction, ModalState, NoticeKind},
    Field,
};
use gloo_timers::callback::Timeout;
use wasm_bindgen::{closure::Closure, JsCast};
use web_sys::{HtmlInputElement, HtmlTextAreaElement, KeyboardEvent};
use yew::prelude::*;

use crate::{
    api,
    config::{CONTACT_EMAIL, ERROR_HIDE_DELAY_MS, SUCCESS_CLOSE_DELAY_MS},
    log, storage,
};

#[derive(Default, PartialEq)]
struct ModalStore(ModalState);

impl Reducible for ModalStore {
    type Action = ModalAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        Rc::new(ModalStore(self.0.apply(action)))
    }
}

#[function_component(TestimonialSubmission)]
pub fn testimonial_submission() -> Html {
    let modal = use_reducer(ModalStore::default);
    // Session whose request is still pending. Closing the dialog does not
    // clear it, but a reopened dialog has a new session and may submit.
    let in_flight = use_mut_ref(|| None::<u32>);
    let state = &modal.0;

    // Escape key and page scroll lock, only while the dialog is open.
    {
        let dispatcher = modal.dispatcher();
        use_effect_with(state.is_open(), move |open| {
            let document = web_sys::window().and_then(|window| window.document());
            let listener = match (open, document) {
                (true, Some(document)) => {
                    let closure = Closure::wrap(Box::new(move |event: KeyboardEvent| {
                        if event.key() == "Escape" {
                            dispatcher.dispatch(ModalAction::Close);
                        }
                    }) as Box<dyn Fn(KeyboardEvent)>);
                    let _ = document
                        .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
                    set_body_scroll_locked(&document, true);
                    Some((document, closure))
                },
                _ => None,
            };

            move || {
                if let Some((document, closure)) = listener {
                    let _ = document.remove_event_listener_with_callback(
                        "keydown",
                        closure.as_ref().unchecked_ref(),
                    );
                    set_body_scroll_locked(&document, false);
                    drop(closure);
                }
            }
        });
    }

    // Error banners hide themselves.
    {
        let dispatcher = modal.dispatcher();
        let error_seq = state
            .notice
            .as_ref()
            .filter(|notice| notice.kind == NoticeKind::Error)
            .map(|notice| notice.seq);
        use_effect_with(error_seq, move |error_seq| {
            let timeout = error_seq.map(|seq| {
                Timeout::new(ERROR_HIDE_DELAY_MS, move || {
                    dispatcher.dispatch(ModalAction::DismissNotice { seq })
                })
            });
            move || drop(timeout)
        });
    }

    // Close a while after a successful submission.
    {
        let dispatcher = modal.dispatcher();
        use_effect_with((state.submitted, state.session), move |(submitted, session)| {
            let session = *session;
            let timeout = submitted.then(|| {
                Timeout::new(SUCCESS_CLOSE_DELAY_MS, move || {
                    dispatcher.dispatch(ModalAction::AutoClose { session })
                })
            });
            move || drop(timeout)
        });
    }

    let on_open = {
        let modal = modal.clone();
        Callback::from(move |_: MouseEvent| {
            modal.dispatch(ModalAction::Open {
                rate_limited: !storage::can_submit(),
            })
        })
    };
    let on_close = {
        let modal = modal.clone();
        Callback::from(move |_: MouseEvent| modal.dispatch(ModalAction::Close))
    };
    let keep_open = Callback::from(|event: MouseEvent| event.stop_propagation());

    let on_submit = {
        let modal = modal.clone();
        let in_flight = in_flight.clone();
        Callback::from(move |event: SubmitEvent| {
            event.prevent_default();
            let session = modal.0.session;
            if *in_flight.borrow() == Some(session) {
                return;
            }
            if !storage::can_submit() {
                modal.dispatch(ModalAction::RateLimited);
                return;
            }
            let ready = modal.0.ready_to_submit();
            modal.dispatch(ModalAction::Submit);
            if !ready {
                return;
            }

            *in_flight.borrow_mut() = Some(session);
            let payload = modal.0.payload();
            let values = modal.0.values.clone();
            let rating = modal.0.rating;
            let dispatcher = modal.dispatcher();
            let in_flight = in_flight.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let result = api::submit_testimonial(payload).await;
                if *in_flight.borrow() == Some(session) {
                    *in_flight.borrow_mut() = None;
                }
                match result {
                    Ok(response) => {
                        storage::record_attempt();
                        log::info("testimonial submitted");
                        dispatcher.dispatch(ModalAction::SubmitSucceeded {
                            session,
                            message: response.message,
                        });
                    },
                    Err(failure) => {
                        log::error(&format!("testimonial submission failed: {failure}"));
                        let mailto = failure
                            .is_retryable()
                            .then(|| fallback_mailto(CONTACT_EMAIL, &values, rating));
                        dispatcher.dispatch(ModalAction::SubmitFailed {
                            session,
                            message: failure.user_message(),
                            mailto,
                        });
                    },
                }
            });
        })
    };

    let open_button = html! {
        <button id="submit-testimonial-btn" type="button" class="btn btn-primary" onclick={on_open}>
            <i class="fa fa-quote-left"></i>
            { " Share Your Experience" }
        </button>
    };
    if !state.is_open() {
        return open_button;
    }

    let notice = state.notice.as_ref().map(|notice| {
        let kind = match notice.kind {
            NoticeKind::Success => "success",
            NoticeKind::Error => "error",
        };
        html! {
            <div class={classes!("form-message", kind)} role="alert">
                { &notice.text }
                if let Some(mailto) = &notice.mailto {
                    { " " }
                    <a href={mailto.clone()}>{ "Send it by email instead." }</a>
                }
            </div>
        }
    });

    let field_view = |field: Field,
                      label: &'static str,
                      input_type: &'static str,
                      maxlength: &'static str,
                      placeholder: &'static str| {
        let error = state.field_errors.get(&field).copied();
        let oninput = {
            let modal = modal.clone();
            Callback::from(move |event: InputEvent| {
                if let Some(value) = event_value(&event) {
                    modal.dispatch(ModalAction::Input { field, value });
                }
            })
        };
        let onblur = {
            let modal = modal.clone();
            Callback::from(move |_: FocusEvent| modal.dispatch(ModalAction::Blur(field)))
        };
        let id = format!("testimonial-{}", field.as_str());
        let value = state.values.get(field).to_string();
        let class = classes!(error.is_some().then_some("error"));
        let disabled = !state.is_editable();
        html! {
            <div class="form-group">
                <label for={id.clone()}>{ label }</label>
                if field == Field::Message {
                    <textarea {id} name={field.as_str()} {maxlength} {placeholder} {class}
                        {value} {oninput} {onblur} {disabled}></textarea>
                } else {
                    <input {id} type={input_type} name={field.as_str()} {maxlength} {placeholder} {class}
                        {value} {oninput} {onblur} {disabled} />
                }
                if let Some(error) = error {
                    <div class="field-error">{ error }</div>
                }
            </div>
        }
    };

    let shown_rating = state.displayed_rating();
    let stars_class = classes!("rating-stars", (!state.is_editable()).then_some("disabled"));
    let stars = (1..=5u8).map(|rating| {
        let onclick = {
            let modal = modal.clone();
            Callback::from(move |_: MouseEvent| modal.dispatch(ModalAction::SelectRating(rating)))
        };
        let onmouseenter = {
            let modal = modal.clone();
            Callback::from(move |_: MouseEvent| {
                modal.dispatch(ModalAction::HoverRating(Some(rating)))
            })
        };
        html! {
            <span
                class={classes!("rating-star", (rating <= shown_rating).then_some("active"))}
                data-rating={rating.to_string()}
                {onclick}
                {onmouseenter}
            >{ "★" }</span>
        }
    });
    let clear_hover = {
        let modal = modal.clone();
        Callback::from(move |_: MouseEvent| modal.dispatch(ModalAction::HoverRating(None)))
    };

    let submit_label = if state.is_submitting() {
        html! { <><span class="loading-spinner"></span>{ "Submitting..." }</> }
    } else {
        html! { "Submit Testimonial" }
    };

    html! {
        <>
            { open_button }
            <div class="testimonial-modal show" onclick={on_close.clone()}>
                <div class="testimonial-modal-content" onclick={keep_open}>
                    <div class="testimonial-modal-header">
                        <h3>{ "Share Your Experience" }</h3>
                        <button type="button" class="testimonial-modal-close" aria-label="Close"
                            onclick={on_close.clone()}>{ "×" }</button>
                    </div>
                    <div id="form-message-container">{ for notice }</div>
                    <form class="testimonial-form" onsubmit={on_submit}>
                        { field_view(Field::Name, "Your Name *", "text", "100", "Enter your full name") }
                        { field_view(Field::Email, "Email Address *", "email", "254", "your.email@example.com") }
                        { field_view(Field::Company, "Company/Title *", "text", "100", "Your company or job title") }
                        { field_view(Field::Message, "Your Testimonial *", "text", "500", "Share your experience...") }
                        <div class="rating-group">
                            <label>{ "Rating *" }</label>
                            <div class={stars_class} onmouseleave={clear_hover}>{ for stars }</div>
                        </div>
                        <div class="form-actions">
                            <button type="button" class="btn btn-secondary" onclick={on_close}>{ "Cancel" }</button>
                            <button type="submit" class="btn btn-primary"
                                disabled={!state.is_editable()}>
                                { submit_label }
                            </button>
                        </div>
                    </form>
                    <div class="privacy-notice">
                        <strong>{ "Privacy Notice:" }</strong>
                        { " Your information is used only to display your testimonial. Your email \
                           address is never shown publicly, and you can ask for removal at any time." }
                    </div>
                </div>
            </div>
        </>
    }
}

fn event_value(event: &InputEvent) -> Option<String> {
    if let Some(input) = event.target_dyn_into::<HtmlInputElement>() {
        return Some(input.value());
    }
    event
        .target_dyn_into::<HtmlTextAreaElement>()
        .map(|area| area.value())
}

fn set_body_scroll_locked(document: &web_sys::Document, locked: bool) {
    if let Some(body) = document.body() {
        let _ = body
            .style()
            .set_property("overflow", if locked { "hidden" } else { "" });
    }
}
