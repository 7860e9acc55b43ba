//! Task and user storage with pluggable backends.
//!
//! Supports:
//! - `memory`: In-memory storage (non-persistent, for tests and ephemeral runs)
//! - `sqlite`: SQLite database (the default)
//!
//! Backends execute the declarative [`TaskQuery`] descriptors produced by
//! the query planner; nothing above this layer builds SQL or touches a
//! connection. Stores are constructed explicitly and injected into the
//! application state, never referenced as ambient globals.

mod memory;
mod sqlite;

pub use memory::InMemoryStore;
pub use sqlite::SqliteStore;

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::model::{Task, User, ValidTask};
use crate::query::TaskQuery;

/// Closed set of storage failures. Uniqueness violations are reported
/// distinguishably so the boundary can answer Conflict instead of leaking
/// backend error codes.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint was violated; the payload names the scope.
    #[error("duplicate {0}")]
    Duplicate(&'static str),

    /// Backend-level failure (I/O, corrupt row, connection trouble).
    #[error("{0}")]
    Backend(String),
}

impl StoreError {
    pub(crate) fn backend(err: impl std::fmt::Display) -> Self {
        StoreError::Backend(err.to_string())
    }
}

/// Persistent collection of users and tasks.
///
/// Task identifiers and timestamps are store-assigned; `updated_at` is
/// refreshed by the store on every mutation.
#[async_trait]
pub trait Store: Send + Sync {
    /// Whether this store persists data across restarts.
    fn is_persistent(&self) -> bool;

    /// Insert a new user. Fails with `Duplicate("email")` when the email is
    /// already registered.
    async fn insert_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, StoreError>;

    /// Look up a user by (lowercased) email.
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Look up a user by identifier.
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    /// Insert a validated task for `owner_id`. Fails with
    /// `Duplicate("task title")` when the owner already has a task with the
    /// same title.
    async fn insert_task(&self, owner_id: Uuid, task: &ValidTask) -> Result<Task, StoreError>;

    /// Exact-title lookup scoped to one owner.
    async fn find_task_by_title(
        &self,
        owner_id: Uuid,
        title: &str,
    ) -> Result<Option<Task>, StoreError>;

    /// Count the tasks matching `query`, ignoring skip/limit.
    async fn count_tasks(&self, query: &TaskQuery) -> Result<u64, StoreError>;

    /// Execute `query` and return the matching tasks in query order.
    async fn find_tasks(&self, query: &TaskQuery) -> Result<Vec<Task>, StoreError>;

    /// Set the completion flag of one task, scoped to its owner, and
    /// refresh `updated_at`. Returns `None` when no task with that id
    /// exists under `owner_id` (including tasks owned by someone else).
    async fn set_task_completion(
        &self,
        owner_id: Uuid,
        task_id: Uuid,
        is_completed: bool,
    ) -> Result<Option<Task>, StoreError>;
}

/// Store backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreType {
    Memory,
    #[default]
    Sqlite,
}

impl StoreType {
    /// Parse from environment variable value.
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "memory" => Self::Memory,
            "sqlite" | "db" => Self::Sqlite,
            _ => Self::default(),
        }
    }
}

/// Create a store based on type and configuration.
pub async fn create_store(
    store_type: StoreType,
    db_path: PathBuf,
) -> Result<Arc<dyn Store>, StoreError> {
    match store_type {
        StoreType::Memory => Ok(Arc::new(InMemoryStore::new())),
        StoreType::Sqlite => {
            let store = SqliteStore::open(db_path).await?;
            Ok(Arc::new(store))
        }
    }
}
