//! Observability HTTP Routes
//!
//! Health check reporting the service version and per-table record counts.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;

use super::task_routes::TaskState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub tables: BTreeMap<String, usize>,
}

/// Health check route
pub fn health_routes(state: Arc<TaskState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .with_state(state)
}

async fn health_handler(State(state): State<Arc<TaskState>>) -> impl IntoResponse {
    let response = HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        tables: state.db.table_counts().await,
    };

    (StatusCode::OK, Json(response))
}
