// Template kind value object

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateKind {
    /// Keyword list shown on the publisher page.
    Keyword,
    /// Search result page listing sponsored ads.
    Serp,
}

impl TemplateKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateKind::Keyword => "keyword",
            TemplateKind::Serp => "serp",
        }
    }
}
