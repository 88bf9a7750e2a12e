// Backend Application Layer

pub mod commands;
pub mod decision;
pub mod error;
pub mod metrics;
pub mod ops;
pub mod queries;
pub mod resolvers;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;

pub use error::AppError;
pub use metrics::Metrics;
pub use ops::{ClickAccumulator, SweepingCache};
pub use resolvers::{PublisherConfigResolver, RuleResolver};
pub use state::AppState;
