//! # Closet Common Library
//!
//! Shared code for the closetd service:
//! - Closet document model and response views
//! - Error types
//! - Blob key derivation
//! - Recognition wire envelopes
//! - Configuration loading

pub mod config;
pub mod envelope;
pub mod error;
pub mod filekey;
pub mod model;

pub use error::{Error, Result};
pub use filekey::{derive_file_key, FileRole};
