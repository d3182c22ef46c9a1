//! Browser-side attempt log used to short-circuit submissions before they
//! reach the network. The server limit stays authoritative.

use folio_shared::rate_window::CLIENT_WINDOW;
use js_sys::Date;
use web_sys::Storage;

use crate::{config::ATTEMPTS_STORAGE_KEY, log};

fn local_storage() -> Option<Storage> {
    web_sys::window()?.local_storage().ok().flatten()
}

fn now_ms() -> i64 {
    Date::now() as i64
}

/// Stored attempt timestamps; unreadable data counts as no attempts.
pub fn load_attempts() -> Vec<i64> {
    local_storage()
        .and_then(|storage| storage.get_item(ATTEMPTS_STORAGE_KEY).ok().flatten())
        .and_then(|raw| serde_json::from_str::<Vec<i64>>(&raw).ok())
        .unwrap_or_default()
}

pub fn can_submit() -> bool {
    CLIENT_WINDOW.allows(&load_attempts(), now_ms())
}

pub fn record_attempt() {
    let attempts = CLIENT_WINDOW.record(&load_attempts(), now_ms());
    let Some(storage) = local_storage() else {
        return;
    };
    let Ok(raw) = serde_json::to_string(&attempts) else {
        return;
    };
    if storage.set_item(ATTEMPTS_STORAGE_KEY, &raw).is_err() {
        log::warn("could not persist submission attempts");
    }
}
