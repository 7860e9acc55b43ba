//! API request and response types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{RecurrenceType, Task, User, Weekday};
use crate::pagination::Page;

/// Login request.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response containing a bearer token for API authentication.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub user: LoginUser,
}

/// The slice of the account echoed back on login.
#[derive(Debug, Clone, Serialize)]
pub struct LoginUser {
    pub id: Uuid,
    pub email: String,
}

/// Public view of a registered account.
#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            created_at: user.created_at,
        }
    }
}

/// Completion-toggle request body.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateCompletionRequest {
    pub is_completed: bool,
}

/// Full task record as returned by every task endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct TaskRecord {
    pub id: Uuid,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub card_color: String,
    pub is_recurring: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurrence_type: Option<RecurrenceType>,
    pub recurrence_days: Vec<Weekday>,
    pub tags: Vec<String>,
    pub is_completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Task> for TaskRecord {
    fn from(task: Task) -> Self {
        Self {
            id: task.id,
            title: task.title,
            description: task.description,
            card_color: task.card_color,
            is_recurring: task.is_recurring,
            recurrence_type: task.recurrence_type,
            recurrence_days: task.recurrence_days,
            tags: task.tags,
            is_completed: task.is_completed,
            scheduled_date: task.scheduled_date,
            created_at: task.created_at,
            updated_at: task.updated_at,
        }
    }
}

/// Paginated task listing.
#[derive(Debug, Clone, Serialize)]
pub struct TaskListResponse {
    #[serde(flatten)]
    pub page: Page,
    pub data: Vec<TaskRecord>,
}

/// Today's tasks plus their count.
#[derive(Debug, Clone, Serialize)]
pub struct TodayTasksResponse {
    pub today_tasks: Vec<TaskRecord>,
    pub count: usize,
}

/// Count of one-off tasks scheduled today.
#[derive(Debug, Clone, Serialize)]
pub struct TodayCountResponse {
    pub today_task_count: u64,
}

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service version
    pub version: String,

    /// Whether the configured store survives restarts
    pub persistent_store: bool,
}
