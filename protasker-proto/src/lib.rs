//! Shared wire types for the `ProTasker` REST API.

pub mod api;
pub mod project;
pub mod task;
