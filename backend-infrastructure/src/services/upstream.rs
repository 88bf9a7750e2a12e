// Shared plumbing for provider HTTP calls

use std::io::Read;
use std::time::Duration;

use flate2::read::GzDecoder;
use reqwest::header::CONTENT_ENCODING;
use reqwest::{Client, Response};
use thiserror::Error;

use crate::services::inventory_normalizer::NormalizeError;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("invalid provider url: {0}")]
    Url(String),
    #[error("provider request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("provider returned status {0}")]
    Status(u16),
    #[error("provider body could not be decompressed: {0}")]
    Decompress(#[from] std::io::Error),
    #[error(transparent)]
    Normalize(#[from] NormalizeError),
    #[error("provider returned no usable items")]
    Empty,
}

pub fn build_client(timeout: Duration, user_agent: &str) -> anyhow::Result<Client> {
    let client = Client::builder()
        .timeout(timeout)
        .user_agent(user_agent.to_string())
        .build()?;
    Ok(client)
}

/// Reads a successful response body, gunzipping it when the provider says so.
pub async fn read_body(response: Response) -> Result<Vec<u8>, UpstreamError> {
    let status = response.status();
    if !status.is_success() {
        return Err(UpstreamError::Status(status.as_u16()));
    }
    let gzipped = response
        .headers()
        .get(CONTENT_ENCODING)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_ascii_lowercase().contains("gzip"))
        .unwrap_or(false);
    let bytes = response.bytes().await?;
    if gzipped && bytes.starts_with(&GZIP_MAGIC) {
        let mut decoded = Vec::with_capacity(bytes.len() * 4);
        GzDecoder::new(bytes.as_ref()).read_to_end(&mut decoded)?;
        return Ok(decoded);
    }
    Ok(bytes.to_vec())
}
