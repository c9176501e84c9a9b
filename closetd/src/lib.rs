//! # closetd
//!
//! Per-user closet management service: clothing metadata in a SQLite
//! document store, image blobs in a file repository, and asynchronous
//! label recognition over Redis pub/sub.
//!
//! The library exposes the service internals so integration tests can
//! construct the stack with mock collaborators; the binary entry point
//! lives in `main.rs`.

pub mod api;
pub mod bridge;
pub mod repo;
pub mod service;

pub use closet_common::{Error, Result};
