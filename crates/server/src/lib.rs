//! HTTP gateway for device image downloads and supervisor release lookups.
//!
//! This crate provides the HTTP surface:
//! - Streamed image downloads from the object store
//! - The supervisor release proxy with uuid-filter resolution
//! - Health endpoint

pub mod auth;
pub mod device_api;
pub mod error;
pub mod handlers;
pub mod resolver;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
