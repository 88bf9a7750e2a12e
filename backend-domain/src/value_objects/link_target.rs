// Link target value object
// Where a delivered link opens, derived from the rule action

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LinkTarget {
    #[default]
    #[serde(rename = "_self")]
    SameFrame,
    #[serde(rename = "_blank")]
    NewTab,
}

impl LinkTarget {
    pub fn from_new_tab_flag(open_in_new_tab: bool) -> Self {
        if open_in_new_tab {
            LinkTarget::NewTab
        } else {
            LinkTarget::SameFrame
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LinkTarget::SameFrame => "_self",
            LinkTarget::NewTab => "_blank",
        }
    }
}
