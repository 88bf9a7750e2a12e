// Domain entities
pub mod click_stat;
pub mod decision;
pub mod inventory;
pub mod publisher_config;
pub mod requests;
pub mod runtime_config;
pub mod targeting_rule;
pub mod telemetry;

pub use click_stat::*;
pub use decision::*;
pub use inventory::*;
pub use publisher_config::*;
pub use requests::*;
pub use runtime_config::*;
pub use targeting_rule::*;
pub use telemetry::*;
