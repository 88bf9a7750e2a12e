// Inventory source value object
// Tells whether delivered items came from the provider or the built-in defaults

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InventorySource {
    Upstream,
    Fallback,
}

impl InventorySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            InventorySource::Upstream => "upstream",
            InventorySource::Fallback => "fallback",
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, InventorySource::Fallback)
    }
}
