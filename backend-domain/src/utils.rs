// Small parsing helpers shared by the request and provider layers

pub const DEFAULT_TILE_WIDTH: u32 = 300;
pub const DEFAULT_TILE_HEIGHT: u32 = 250;

/// Parses `WIDTHxHEIGHT`, keeping the default for any part that is missing or not positive.
pub fn parse_tile_size(value: &str) -> (u32, u32) {
    let mut width = DEFAULT_TILE_WIDTH;
    let mut height = DEFAULT_TILE_HEIGHT;
    let lowered = value.trim().to_lowercase();
    let parts: Vec<&str> = lowered.split('x').collect();
    if parts.len() == 2 {
        if let Ok(parsed) = parts[0].trim().parse::<u32>() {
            if parsed > 0 {
                width = parsed;
            }
        }
        if let Ok(parsed) = parts[1].trim().parse::<u32>() {
            if parsed > 0 {
                height = parsed;
            }
        }
    }
    (width, height)
}

/// Text after the final dot, when the domain has one (`forbes.com` -> `com`).
pub fn top_level_domain(domain: &str) -> Option<&str> {
    let (_, tld) = domain.trim().rsplit_once('.')?;
    if tld.is_empty() {
        None
    } else {
        Some(tld)
    }
}

/// A template reference must be a bare file name: non-empty, no path separators, no `..`.
pub fn is_plain_template_name(value: &str) -> bool {
    let value = value.trim();
    !value.is_empty() && !value.contains('/') && !value.contains('\\') && !value.contains("..")
}

pub fn parse_i64_or_zero(value: &str) -> i64 {
    value.trim().parse().unwrap_or(0)
}
