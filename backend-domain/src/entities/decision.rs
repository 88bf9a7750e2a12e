// Decision entity
// Final bounded delivery handed to the renderer and telemetry writer

use serde::Serialize;

use crate::entities::{PublisherConfig, TargetingRule};
use crate::value_objects::{InventorySource, LinkTarget};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Decision<T> {
    Blocked { rule: TargetingRule },
    Delivered(DecisionResult<T>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecisionResult<T> {
    pub items: Vec<T>,
    pub capacity: usize,
    pub template: String,
    pub link_target: LinkTarget,
    pub source: InventorySource,
    pub is_bot: bool,
    pub rule: TargetingRule,
    pub publisher: PublisherConfig,
}

impl<T> Decision<T> {
    pub fn is_blocked(&self) -> bool {
        matches!(self, Decision::Blocked { .. })
    }

    pub fn delivered(&self) -> Option<&DecisionResult<T>> {
        match self {
            Decision::Delivered(result) => Some(result),
            Decision::Blocked { .. } => None,
        }
    }

    pub fn items(&self) -> &[T] {
        match self {
            Decision::Delivered(result) => &result.items,
            Decision::Blocked { .. } => &[],
        }
    }
}
