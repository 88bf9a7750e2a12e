// Pure domain services
pub mod capacity_inspector;
pub mod rule_selection;
pub mod user_agent;

pub use capacity_inspector::*;
pub use rule_selection::*;
pub use user_agent::*;
