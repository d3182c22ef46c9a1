//! Teardown of the jQuery owl carousel that the page's own script attaches
//! to the testimonial host before the wasm carousel takes over.

use js_sys::{Function, Reflect};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::Element;

use crate::log;

const OWL_DATA_KEY: &str = "owl.carousel";
const OWL_TEARDOWN_EVENTS: [&str; 2] = ["stop.owl.autoplay", "destroy.owl.carousel"];
const OWL_CLASSES: [&str; 3] = ["owl-carousel", "owl-loaded", "owl-theme"];

/// What teardown needs from the carousel host.
trait CarouselHost {
    fn has_instance(&self) -> bool;
    fn trigger(&self, event: &str) -> bool;
    fn remove_classes(&self, classes: [&str; 3]) -> bool;
}

/// Stops and destroys the owl instance bound to `host` and drops its marker
/// classes. Returns `false` when jQuery is absent or no instance exists.
pub fn destroy_carousel(host: &Element) -> bool {
    match jquery_wrap(host) {
        Some(wrapped) => teardown(&JqueryHost {
            element: host,
            wrapped,
        }),
        None => false,
    }
}

fn teardown(host: &impl CarouselHost) -> bool {
    if !host.has_instance() {
        return false;
    }
    for event in OWL_TEARDOWN_EVENTS {
        if !host.trigger(event) {
            log::warn(&format!("owl carousel did not accept `{event}`"));
        }
    }
    if !host.remove_classes(OWL_CLASSES) {
        log::warn("could not clear owl carousel classes");
    }
    true
}

struct JqueryHost<'a> {
    element: &'a Element,
    wrapped: JsValue,
}

impl CarouselHost for JqueryHost<'_> {
    fn has_instance(&self) -> bool {
        call_method(&self.wrapped, "data", OWL_DATA_KEY)
            .is_some_and(|instance| !instance.is_undefined() && !instance.is_null())
    }

    fn trigger(&self, event: &str) -> bool {
        call_method(&self.wrapped, "trigger", event).is_some()
    }

    fn remove_classes(&self, [first, second, third]: [&str; 3]) -> bool {
        self.element
            .class_list()
            .remove_3(first, second, third)
            .is_ok()
    }
}

/// `jQuery(host)`, if the page loaded jQuery.
fn jquery_wrap(host: &Element) -> Option<JsValue> {
    Reflect::get(&js_sys::global(), &JsValue::from_str("jQuery"))
        .ok()?
        .dyn_into::<Function>()
        .ok()?
        .call1(&JsValue::NULL, host)
        .ok()
}

fn call_method(target: &JsValue, name: &str, arg: &str) -> Option<JsValue> {
    Reflect::get(target, &JsValue::from_str(name))
        .ok()?
        .dyn_into::<Function>()
        .ok()?
        .call1(target, &JsValue::from_str(arg))
        .ok()
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    #[derive(Default)]
    struct RecordingHost {
        instance: bool,
        calls: RefCell<Vec<String>>,
    }

    impl CarouselHost for RecordingHost {
        fn has_instance(&self) -> bool {
            self.instance
        }

        fn trigger(&self, event: &str) -> bool {
            self.calls.borrow_mut().push(format!("trigger {event}"));
            true
        }

        fn remove_classes(&self, classes: [&str; 3]) -> bool {
            self.calls
                .borrow_mut()
                .push(format!("remove {}", classes.join(" ")));
            true
        }
    }

    #[test]
    fn live_carousel_is_stopped_destroyed_and_unmarked() {
        let host = RecordingHost {
            instance: true,
            ..RecordingHost::default()
        };
        assert!(teardown(&host));
        assert_eq!(
            host.calls.into_inner(),
            vec![
                "trigger stop.owl.autoplay",
                "trigger destroy.owl.carousel",
                "remove owl-carousel owl-loaded owl-theme",
            ]
        );
    }

    #[test]
    fn host_without_instance_is_left_alone() {
        let host = RecordingHost::default();
        assert!(!teardown(&host));
        assert!(host.calls.into_inner().is_empty());
    }
}
