pub mod auth;
pub mod client;

pub use auth::*;
pub use client::*;
