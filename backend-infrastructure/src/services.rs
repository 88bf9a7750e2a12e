pub mod ad_fetcher;
pub mod health_service;
pub mod inventory_normalizer;
pub mod keyword_fetcher;
pub mod upstream;

pub use ad_fetcher::*;
pub use health_service::*;
pub use inventory_normalizer::*;
pub use keyword_fetcher::*;
pub use upstream::UpstreamError;
