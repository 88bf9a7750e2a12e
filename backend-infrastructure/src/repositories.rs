pub mod clickhouse_telemetry;
pub mod config_files;
pub mod template_files;

pub use clickhouse_telemetry::*;
pub use config_files::*;
pub use template_files::*;
