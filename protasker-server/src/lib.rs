//! `ProTasker` API server library.
//!
//! Exposes the REST task store for use in tests and embedding. Projects and
//! tasks live in memory; callers authenticate with bearer tokens provisioned
//! through configuration.

pub mod api;
pub mod auth;
pub mod config;
pub mod store;
