//! HTTP API: parameter binding, routing, sessions and the blog handlers.

pub mod app;
pub mod binder;
pub mod context;
pub mod middleware;
