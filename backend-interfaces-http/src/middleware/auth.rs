use axum::http::HeaderMap;

use backend_domain::RuntimeConfig;

/// Admin and ops endpoints are open when no admin token is configured.
pub fn authorize(config: &RuntimeConfig, headers: &HeaderMap) -> bool {
    if let Some(admin_token) = &config.admin_token {
        return extract_bearer(headers)
            .map(|v| v == *admin_token)
            .unwrap_or(false);
    }
    true
}

fn extract_bearer(headers: &HeaderMap) -> Option<String> {
    let value = headers.get("Authorization")?.to_str().ok()?.trim();
    let token = value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }
    Some(token.to_string())
}
