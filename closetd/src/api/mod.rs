//! HTTP API surface
//!
//! Thin axum layer over the closet service: route registration, parameter
//! binding, and error-to-status mapping. All domain behavior lives in the
//! service.

mod handlers;
mod server;

pub use server::{create_router, AppContext};
