pub mod admin_handlers;
pub mod decision_handlers;
pub mod ops_handlers;
pub mod telemetry_handlers;

pub use admin_handlers::*;
pub use decision_handlers::*;
pub use ops_handlers::*;
pub use telemetry_handlers::*;
