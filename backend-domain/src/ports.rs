// Ports implemented by storage, template and upstream adapters

pub mod repositories;
pub mod services;

pub use repositories::*;
pub use services::*;
