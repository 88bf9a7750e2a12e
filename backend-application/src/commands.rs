pub mod cache_commands;
pub mod publisher_config_commands;
pub mod rule_commands;
pub mod telemetry_commands;
