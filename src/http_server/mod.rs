//! # taskdb HTTP Server Module
//!
//! Axum server exposing the task API over the record store.
//!
//! # Endpoints
//!
//! - `GET /health` - Health check with table counts
//! - `GET /tasks/export` - CSV download of active tasks
//! - `GET|POST /tasks` - List (`isCompleted`, `search`) and create
//! - `GET|PUT|DELETE /tasks/:id` - Read, update, delete
//! - `PATCH /tasks/:id/complete` - Move a task to the completed table

pub mod config;
pub mod errors;
pub mod export;
pub mod observability_routes;
pub mod server;
pub mod task_routes;

pub use config::HttpServerConfig;
pub use errors::{ApiResult, TaskApiError};
pub use server::HttpServer;
pub use task_routes::{task_routes, TaskState, COMPLETED_TABLE, TASKS_TABLE};
