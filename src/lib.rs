//! taskdb - a task-management HTTP API over an embedded JSON record store
//!
//! - [`store`]: table storage persisted as one pretty-printed JSON document
//! - [`http_server`]: axum routes for tasks, CSV export and health
//! - [`cli`]: `serve` and `inspect` commands
//! - [`observability`]: structured JSON-lines logging

pub mod cli;
pub mod http_server;
pub mod observability;
pub mod store;
