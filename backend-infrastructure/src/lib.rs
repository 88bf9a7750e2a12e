// Adapters: config files, ClickHouse telemetry, template files, upstream providers

pub mod config;
pub mod repositories;
pub mod services;
pub mod utils;

pub use config::*;
pub use repositories::*;
pub use services::*;
