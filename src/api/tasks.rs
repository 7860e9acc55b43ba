//! Task endpoints.
//!
//! Every handler runs behind the auth middleware and receives the resolved
//! [`AuthUser`]; task queries are planned per owner and executed by the
//! injected store.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path, Query, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use super::auth::AuthUser;
use super::routes::AppState;
use super::types::{
    TaskListResponse, TaskRecord, TodayCountResponse, TodayTasksResponse, UpdateCompletionRequest,
};
use crate::error::ApiError;
use crate::model::NewTask;
use crate::pagination::{self, ListParams};
use crate::query;

/// Create the task API routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_task).get(list_tasks))
        .route("/today", get(today_tasks))
        .route("/today/count", get(today_task_count))
        .route("/:id", patch(update_task_completion))
}

/// Create a new task.
async fn create_task(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<NewTask>, JsonRejection>,
) -> Result<(StatusCode, Json<TaskRecord>), ApiError> {
    let Json(payload) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    if !payload.recurrence_is_valid() {
        return Err(ApiError::BadRequest(
            "Invalid or missing recurrence type".to_string(),
        ));
    }
    let task = payload.validated().map_err(ApiError::Validation)?;

    if state
        .store
        .find_task_by_title(user.id, &task.title)
        .await?
        .is_some()
    {
        return Err(ApiError::Conflict(
            "A task with this title already exists".to_string(),
        ));
    }

    let created = state.store.insert_task(user.id, &task).await?;
    Ok((StatusCode::CREATED, Json(TaskRecord::from(created))))
}

/// Raw list-query parameters; normalization happens in [`ListParams`].
#[derive(Debug, Deserialize)]
struct ListTasksQuery {
    page: Option<String>,
    limit: Option<String>,
    search: Option<String>,
}

/// List the caller's tasks, paginated, optionally filtered by a title
/// search term.
async fn list_tasks(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(raw): Query<ListTasksQuery>,
) -> Result<Json<TaskListResponse>, ApiError> {
    let params = ListParams::normalize(
        raw.page.and_then(|p| p.parse().ok()),
        raw.limit.and_then(|l| l.parse().ok()),
        raw.search,
    );

    let plan = query::list_query(user.id, &params);
    let total_items = state.store.count_tasks(&plan).await?;
    let page = pagination::paginate(params.page, params.limit, total_items);
    let tasks = state.store.find_tasks(&plan).await?;

    Ok(Json(TaskListResponse {
        page,
        data: tasks.into_iter().map(TaskRecord::from).collect(),
    }))
}

/// Today's tasks: one-off tasks dated today plus recurring tasks whose rule
/// matches today, as a single composite store query.
async fn today_tasks(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<TodayTasksResponse>, ApiError> {
    let plan = query::today_list_query(user.id, Utc::now().date_naive());
    let tasks = state.store.find_tasks(&plan).await?;
    let count = tasks.len();

    Ok(Json(TodayTasksResponse {
        today_tasks: tasks.into_iter().map(TaskRecord::from).collect(),
        count,
    }))
}

/// Count of one-off tasks scheduled today. Recurring tasks are not counted
/// here even though the listing includes them.
async fn today_task_count(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<TodayCountResponse>, ApiError> {
    let plan = query::today_count_query(user.id, Utc::now().date_naive());
    let today_task_count = state.store.count_tasks(&plan).await?;
    Ok(Json(TodayCountResponse { today_task_count }))
}

/// Toggle a task's completion flag. The lookup is ownership-scoped, so a
/// task id belonging to another user answers NotFound.
async fn update_task_completion(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(task_id): Path<Uuid>,
    payload: Result<Json<UpdateCompletionRequest>, JsonRejection>,
) -> Result<Json<TaskRecord>, ApiError> {
    let Json(req) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let task = state
        .store
        .set_task_completion(user.id, task_id, req.is_completed)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(TaskRecord::from(task)))
}
