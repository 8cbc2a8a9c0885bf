//! Task HTTP Routes
//!
//! Endpoints for creating, listing, updating, completing, deleting and
//! exporting tasks. Active tasks live in the `tasks` table; completed tasks
//! are moved to the `completed` table.

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::PathRejection, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch},
    Json, Router,
};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use super::errors::{ApiResult, TaskApiError};
use super::export::{render_csv, write_export, EXPORT_FILE_NAME};
use crate::observability::Logger;
use crate::store::{Database, Record, SearchCriteria};

/// Table holding active tasks
pub const TASKS_TABLE: &str = "tasks";

/// Table holding completed tasks
pub const COMPLETED_TABLE: &str = "completed";

// ==================
// Shared State
// ==================

/// State shared across task handlers
#[derive(Debug, Clone)]
pub struct TaskState {
    pub db: Database,
    /// Directory the CSV export is written to
    pub export_dir: PathBuf,
}

impl TaskState {
    pub fn new(db: Database, export_dir: impl Into<PathBuf>) -> Self {
        Self {
            db,
            export_dir: export_dir.into(),
        }
    }
}

// ==================
// Request Types
// ==================

/// Query string accepted by the read and delete routes.
///
/// Extracted from raw pairs so a repeated key never rejects the request;
/// the last occurrence wins and unknown keys are ignored.
#[derive(Debug, Default)]
pub struct TaskQuery {
    /// `"true"` (any case) selects the completed table
    pub is_completed: Option<String>,

    /// Substring matched against title OR description
    pub search: Option<String>,
}

impl TaskQuery {
    /// Fold raw query pairs into the known keys
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut query = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                "isCompleted" => query.is_completed = Some(value),
                "search" => query.search = Some(value),
                _ => {}
            }
        }
        query
    }

    /// Whether `isCompleted` asks for the completed table
    pub fn wants_completed(&self) -> bool {
        self.is_completed
            .as_deref()
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }

    /// Table selected by `isCompleted`
    pub fn table(&self) -> &'static str {
        if self.wants_completed() {
            COMPLETED_TABLE
        } else {
            TASKS_TABLE
        }
    }

    fn criteria(&self) -> Option<SearchCriteria> {
        let needle = self.search.as_deref().filter(|s| !s.is_empty())?;
        Some(
            SearchCriteria::new()
                .field("title", needle)
                .field("description", needle),
        )
    }
}

/// Body of create and update requests
#[derive(Debug, Deserialize)]
struct TaskInput {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

impl TaskInput {
    /// Parse a request body; an empty body counts as `{}`.
    fn parse(body: &[u8]) -> ApiResult<Self> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self {
                title: None,
                description: None,
            });
        }

        let value: Value = serde_json::from_slice(body)
            .map_err(|e| TaskApiError::InvalidBody(e.to_string()))?;
        if !value.is_object() {
            return Err(TaskApiError::InvalidBody(
                "expected a JSON object".to_string(),
            ));
        }
        serde_json::from_value(value).map_err(|e| TaskApiError::InvalidBody(e.to_string()))
    }

    /// Both fields, or `MissingFields` if either is absent or empty
    fn require(self) -> ApiResult<(String, String)> {
        match (self.title, self.description) {
            (Some(title), Some(description)) if !title.is_empty() && !description.is_empty() => {
                Ok((title, description))
            }
            _ => Err(TaskApiError::MissingFields),
        }
    }
}

// ==================
// Task Routes
// ==================

/// Create task routes
pub fn task_routes(state: Arc<TaskState>) -> Router {
    Router::new()
        .route("/tasks/export", get(export_tasks_handler))
        .route("/tasks", get(list_tasks_handler).post(create_task_handler))
        .route(
            "/tasks/:id",
            get(get_task_handler)
                .put(update_task_handler)
                .delete(delete_task_handler),
        )
        .route("/tasks/:id/complete", patch(complete_task_handler))
        .with_state(state)
}

// ==================
// Helper Functions
// ==================

/// The `:id` segment, with extractor failures reported as JSON errors
fn task_id(path: Result<Path<String>, PathRejection>) -> ApiResult<String> {
    let Path(id) = path.map_err(|e| TaskApiError::InvalidPath(e.body_text()))?;
    if id.trim().is_empty() {
        return Err(TaskApiError::MissingId);
    }
    Ok(id)
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

// ==================
// Handlers
// ==================

async fn export_tasks_handler(State(state): State<Arc<TaskState>>) -> ApiResult<Response> {
    let tasks = state.db.select(TASKS_TABLE, None).await;
    if tasks.is_empty() {
        return Err(TaskApiError::NothingToExport);
    }

    let csv = render_csv(&tasks);
    let path = write_export(&state.export_dir, &csv).await.map_err(|e| {
        Logger::error(
            "EXPORT_FAILED",
            &[
                ("dir", state.export_dir.display().to_string().as_str()),
                ("error", e.to_string().as_str()),
            ],
        );
        TaskApiError::Export(e.to_string())
    })?;

    Logger::info(
        "EXPORT_WRITTEN",
        &[
            ("path", path.display().to_string().as_str()),
            ("rows", tasks.len().to_string().as_str()),
        ],
    );

    let disposition = format!("attachment; filename=\"{}\"", EXPORT_FILE_NAME);
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv,
    )
        .into_response())
}

async fn list_tasks_handler(
    State(state): State<Arc<TaskState>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Json<Vec<Record>> {
    let query = TaskQuery::from_pairs(pairs);
    let criteria = query.criteria();
    Json(state.db.select(query.table(), criteria.as_ref()).await)
}

async fn get_task_handler(
    State(state): State<Arc<TaskState>>,
    path: Result<Path<String>, PathRejection>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> ApiResult<Json<Vec<Record>>> {
    let id = task_id(path)?;
    let query = TaskQuery::from_pairs(pairs);

    let task = state
        .db
        .find(query.table(), &id)
        .await
        .ok_or(TaskApiError::NotFound)?;

    Ok(Json(vec![task]))
}

async fn create_task_handler(
    State(state): State<Arc<TaskState>>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<Record>)> {
    let (title, description) = TaskInput::parse(&body)?.require()?;

    let mut task = Record::with_id(Uuid::new_v4().to_string());
    task.set("title", title);
    task.set("description", description);
    task.set("created_at", now());
    task.set("updated_at", Value::Null);

    let task = state.db.insert(TASKS_TABLE, task).await?;

    Ok((StatusCode::CREATED, Json(task)))
}

async fn update_task_handler(
    State(state): State<Arc<TaskState>>,
    path: Result<Path<String>, PathRejection>,
    body: Bytes,
) -> ApiResult<StatusCode> {
    let id = task_id(path)?;
    let (title, description) = TaskInput::parse(&body)?.require()?;

    let mut task = state
        .db
        .find(TASKS_TABLE, &id)
        .await
        .ok_or(TaskApiError::NotFound)?;
    task.set("title", title);
    task.set("description", description);
    task.set("updated_at", now());

    // The task may have been completed or deleted since the lookup
    if !state.db.update(TASKS_TABLE, &id, task).await? {
        return Err(TaskApiError::NotFound);
    }

    Ok(StatusCode::NO_CONTENT)
}

async fn delete_task_handler(
    State(state): State<Arc<TaskState>>,
    path: Result<Path<String>, PathRejection>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> ApiResult<StatusCode> {
    let id = task_id(path)?;
    let query = TaskQuery::from_pairs(pairs);

    if !state.db.delete(query.table(), &id).await? {
        return Err(TaskApiError::NotFound);
    }

    Ok(StatusCode::NO_CONTENT)
}

async fn complete_task_handler(
    State(state): State<Arc<TaskState>>,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<Json<Record>> {
    let id = task_id(path)?;

    if state.db.find(COMPLETED_TABLE, &id).await.is_some() {
        return Err(TaskApiError::AlreadyCompleted);
    }

    let completed_at = now();
    let task = state
        .db
        .move_record(TASKS_TABLE, COMPLETED_TABLE, &id, move |task| {
            task.set("completed_at", completed_at);
        })
        .await?
        .ok_or(TaskApiError::NotFound)?;

    Ok(Json(task))
}
