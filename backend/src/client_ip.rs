use std::net::IpAddr;

use axum::http::{HeaderMap, HeaderValue};

/// Caller address as reported by the fronting proxy: `client-ip`, then the
/// first `x-forwarded-for` hop, then `x-real-ip`. Empty when none is set.
pub fn extract_client_ip(headers: &HeaderMap) -> String {
    first_token(headers.get("client-ip"))
        .or_else(|| first_token(headers.get("x-forwarded-for")))
        .or_else(|| first_token(headers.get("x-real-ip")))
        .unwrap_or_default()
}

fn first_token(value: Option<&HeaderValue>) -> Option<String> {
    let raw = value?.to_str().ok()?;
    let token = raw.split(',').next()?.trim().trim_matches('"');
    if token.is_empty() {
        return None;
    }
    Some(normalize_ip_token(token).unwrap_or_else(|| token.to_string()))
}

/// Canonical form of `ip`, `[v6]:port` or `v4:port`; `None` if not an address.
fn normalize_ip_token(token: &str) -> Option<String> {
    if let Ok(ip) = token.parse::<IpAddr>() {
        return Some(ip.to_string());
    }

    if let Some(rest) = token.strip_prefix('[') {
        let (host, suffix) = rest.split_once(']')?;
        let port_ok = suffix.is_empty()
            || suffix
                .strip_prefix(':')
                .is_some_and(|port| !port.is_empty() && port.chars().all(|ch| ch.is_ascii_digit()));
        if port_ok {
            return host.parse::<IpAddr>().ok().map(|ip| ip.to_string());
        }
        return None;
    }

    let (host, port) = token.rsplit_once(':')?;
    if host.contains('.') && !port.is_empty() && port.chars().all(|ch| ch.is_ascii_digit()) {
        return host.parse::<IpAddr>().ok().map(|ip| ip.to_string());
    }
    None
}
