//! HTTP request handlers.

pub mod download;
pub mod health;
pub mod releases;

pub use download::download_image;
pub use health::health_check;
pub use releases::proxy_supervisor_release;
