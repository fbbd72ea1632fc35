//! Heimdall API Module
//!
//! The HTTP surface of the dashboard: statistics endpoints, analyzer
//! invocation, the capability probe, and the static dashboard itself.

pub mod error;
pub mod handlers;
pub mod models;
pub mod server;

pub use error::ApiError;
pub use handlers::*;
pub use models::*;
pub use server::*;
