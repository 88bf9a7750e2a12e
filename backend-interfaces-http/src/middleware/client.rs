use std::net::SocketAddr;

use axum::http::header::USER_AGENT;
use axum::http::HeaderMap;
use reqwest::Url;

use backend_application::commands::telemetry_commands::Visitor;

/// First `X-Forwarded-For` entry, then `X-Real-IP`, then the socket peer.
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
    };
    if let Some(forwarded) = header("X-Forwarded-For") {
        if let Some(first) = forwarded.split(',').map(str::trim).find(|v| !v.is_empty()) {
            return first.to_string();
        }
    }
    if let Some(real_ip) = header("X-Real-IP") {
        return real_ip.to_string();
    }
    peer.map(|addr| addr.ip().to_string()).unwrap_or_default()
}

pub fn user_agent(headers: &HeaderMap) -> String {
    headers
        .get(USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

pub fn visitor(headers: &HeaderMap, peer: Option<SocketAddr>) -> Visitor {
    Visitor {
        client_ip: client_ip(headers, peer),
        user_agent: user_agent(headers),
    }
}

/// Only absolute http(s) targets may be redirected to.
pub fn safe_target_url(raw: &str) -> Option<String> {
    let parsed = Url::parse(raw.trim()).ok()?;
    match parsed.scheme() {
        "http" | "https" if parsed.has_host() => Some(parsed.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn client_ip_prefers_forwarded_headers() {
        let peer: SocketAddr = "10.0.0.5:41000".parse().expect("addr");
        let mut headers = HeaderMap::new();
        assert_eq!(client_ip(&headers, Some(peer)), "10.0.0.5");

        headers.insert("X-Real-IP", HeaderValue::from_static(" 198.51.100.2 "));
        assert_eq!(client_ip(&headers, Some(peer)), "198.51.100.2");

        headers.insert(
            "X-Forwarded-For",
            HeaderValue::from_static("203.0.113.9, 10.0.0.1"),
        );
        assert_eq!(client_ip(&headers, Some(peer)), "203.0.113.9");
        assert_eq!(client_ip(&HeaderMap::new(), None), "");
    }

    #[test]
    fn only_absolute_http_targets_are_safe() {
        assert_eq!(
            safe_target_url(" https://shop.example.com/a?b=1 ").as_deref(),
            Some("https://shop.example.com/a?b=1")
        );
        assert!(safe_target_url("javascript:alert(1)").is_none());
        assert!(safe_target_url("/relative/path").is_none());
        assert!(safe_target_url("ftp://files.example.com").is_none());
    }
}
