// Domain value objects
pub mod inventory_source;
pub mod link_target;
pub mod template_kind;

pub use inventory_source::*;
pub use link_target::*;
pub use template_kind::*;
