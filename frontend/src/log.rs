use wasm_bindgen::JsValue;

const PREFIX: &str = "[Testimonials]";

pub fn info(message: &str) {
    web_sys::console::log_1(&JsValue::from_str(&format!("{PREFIX} {message}")));
}

pub fn warn(message: &str) {
    web_sys::console::warn_1(&JsValue::from_str(&format!("{PREFIX} {message}")));
}

pub fn error(message: &str) {
    web_sys::console::error_1(&JsValue::from_str(&format!("{PREFIX} {message}")));
}
