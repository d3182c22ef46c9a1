use std::rc::Rc;

use folio_shared::{display::CarouselPosition, PublicTestimonial};
use gloo_timers::callback::Interval;
use yew::prelude::*;

use super::star_rating::StarRating;
use crate::config::AUTOPLAY_INTERVAL_MS;

#[derive(Properties, PartialEq)]
pub struct TestimonialCarouselProps {
    pub testimonials: Vec<PublicTestimonial>,
}

enum SlideAction {
    Next,
    Prev,
    GoTo(usize),
}

#[derive(Clone, Copy, PartialEq)]
struct Slides(CarouselPosition);

impl Reducible for Slides {
    type Action = SlideAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let position = match action {
            SlideAction::Next => self.0.next(),
            SlideAction::Prev => self.0.prev(),
            SlideAction::GoTo(index) => self.0.go_to(index),
        };
        Rc::new(Slides(position))
    }
}

/// One testimonial at a time, looping, with autoplay paused while hovered.
#[function_component(TestimonialCarousel)]
pub fn testimonial_carousel(props: &TestimonialCarouselProps) -> Html {
    let total = props.testimonials.len();
    let slides = use_reducer(|| Slides(CarouselPosition::new(total)));
    let hovered = use_state(|| false);

    {
        let dispatcher = slides.dispatcher();
        use_effect_with((*hovered, total), move |(hovered, total)| {
            let interval = (!*hovered && *total > 1).then(|| {
                Interval::new(AUTOPLAY_INTERVAL_MS, move || dispatcher.dispatch(SlideAction::Next))
            });
            move || drop(interval)
        });
    }

    let onmouseenter = {
        let hovered = hovered.clone();
        Callback::from(move |_: MouseEvent| hovered.set(true))
    };
    let onmouseleave = {
        let hovered = hovered.clone();
        Callback::from(move |_: MouseEvent| hovered.set(false))
    };
    let on_prev = {
        let slides = slides.clone();
        Callback::from(move |_: MouseEvent| slides.dispatch(SlideAction::Prev))
    };
    let on_next = {
        let slides = slides.clone();
        Callback::from(move |_: MouseEvent| slides.dispatch(SlideAction::Next))
    };

    let position = slides.0;
    let items = props.testimonials.iter().enumerate().map(|(index, item)| {
        let active = index == position.index();
        html! {
            <div class={classes!("item", active.then_some("active"))} aria-hidden={(!active).to_string()}>
                <div class="testimonial-box">
                    <div class="testimonial-text">
                        <p>{ &item.message }</p>
                    </div>
                    <div class="testimonial-author">
                        <div class="author-info">
                            <h4>{ &item.name }</h4>
                            <span>{ &item.company }</span>
                        </div>
                        <StarRating rating={item.rating} />
                    </div>
                </div>
            </div>
        }
    });
    let dots = (0..total).map(|index| {
        let slides = slides.clone();
        let onclick = Callback::from(move |_: MouseEvent| slides.dispatch(SlideAction::GoTo(index)));
        html! {
            <button
                type="button"
                class={classes!("testimonial-dot", (index == position.index()).then_some("active"))}
                aria-label={format!("Show testimonial {}", index + 1)}
                {onclick}
            ></button>
        }
    });

    html! {
        <div class="testimonial-carousel-live" {onmouseenter} {onmouseleave}>
            <div class="testimonial-stage">{ for items }</div>
            if total > 1 {
                <div class="testimonial-nav">
                    <button type="button" class="testimonial-prev" aria-label="Previous testimonial" onclick={on_prev}>
                        <i class="fa fa-angle-left"></i>
                    </button>
                    <button type="button" class="testimonial-next" aria-label="Next testimonial" onclick={on_next}>
                        <i class="fa fa-angle-right"></i>
                    </button>
                </div>
                <div class="testimonial-dots">{ for dots }</div>
            }
            <div class="testimonial-counter">{ position.label() }</div>
        </div>
    }
}
