pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;

pub use error::HttpError;
pub use routes::build_router;
