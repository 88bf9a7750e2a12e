use anyhow::{anyhow, Result};

pub fn validate_http_url(field: &str, value: &str) -> Result<()> {
    let parsed = reqwest::Url::parse(value.trim())
        .map_err(|err| anyhow!("invalid {field}: {err}"))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(anyhow!("{field} must use http or https, got {other}")),
    }
}
