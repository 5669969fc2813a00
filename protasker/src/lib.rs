//! `ProTasker` terminal client: board state, drag handling, optimistic
//! status reconciliation, and the REST task store.

pub mod app;
pub mod board;
pub mod config;
pub mod drag;
pub mod http;
pub mod net;
pub mod reconcile;
pub mod session;
pub mod store;
pub mod ui;
