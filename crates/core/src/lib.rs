//! Shared types for the hangar gateway.
//!
//! This crate provides:
//! - Configuration types read once at process start
//! - The object-key deriver for built device images
//! - The supervisor-release filter grammar (classify + rewrite)

pub mod config;
pub mod filter;
pub mod image;

pub use filter::FilterKind;
pub use image::image_key;
