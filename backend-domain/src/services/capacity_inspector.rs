// Template capacity inspection
// Counts how many keyword or ad slots a template can present

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;

use crate::value_objects::TemplateKind;

pub const KEYWORD_SLOT_MARKER: &str = r#"class="keyword-item""#;

fn ad_href_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\{\{\s*\.AdHref(\d+)\s*\}\}").expect("ad href pattern is valid")
    })
}

/// Returns 0 when the markup has no recognizable markers; callers pick a minimum.
pub fn count_slots(markup: &str, kind: TemplateKind) -> usize {
    match kind {
        TemplateKind::Keyword => count_keyword_slots(markup),
        TemplateKind::Serp => count_ad_slots(markup),
    }
}

pub fn count_keyword_slots(markup: &str) -> usize {
    markup.matches(KEYWORD_SLOT_MARKER).count()
}

/// Distinct `{{.AdHrefN}}` numbers; a repeated number counts once.
pub fn count_ad_slots(markup: &str) -> usize {
    ad_href_pattern()
        .captures_iter(markup)
        .filter_map(|caps| caps.get(1))
        .filter_map(|digits| digits.as_str().parse::<u64>().ok())
        .collect::<HashSet<_>>()
        .len()
}
