//! SQLite-backed store.
//!
//! One connection behind a mutex; every call runs on the blocking pool.
//! Timestamps and scheduled dates are stored as RFC 3339 text (UTC, fixed
//! offset), so range comparisons and ordering work lexicographically.
//! `recurrence_days` and `tags` are stored as JSON arrays; the weekly
//! membership predicate uses `json_each`.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{Store, StoreError};
use crate::model::{RecurrenceType, Task, User, ValidTask};
use crate::query::{TaskFilter, TaskQuery, TaskSort};

const SCHEMA: &str = r#"
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY NOT NULL,
    name TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS tasks (
    id TEXT PRIMARY KEY NOT NULL,
    owner_id TEXT NOT NULL,
    title TEXT NOT NULL,
    description TEXT,
    card_color TEXT NOT NULL DEFAULT '#ffffff',
    is_recurring INTEGER NOT NULL DEFAULT 0,
    recurrence_type TEXT,
    recurrence_days TEXT NOT NULL DEFAULT '[]',
    tags TEXT NOT NULL DEFAULT '[]',
    is_completed INTEGER NOT NULL DEFAULT 0,
    scheduled_date TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    FOREIGN KEY (owner_id) REFERENCES users(id) ON DELETE CASCADE
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_tasks_owner_title ON tasks(owner_id, title);
CREATE INDEX IF NOT EXISTS idx_tasks_owner_scheduled ON tasks(owner_id, scheduled_date);
"#;

const TASK_COLUMNS: &str = "id, owner_id, title, description, card_color, is_recurring, \
     recurrence_type, recurrence_days, tags, is_completed, scheduled_date, created_at, updated_at";

pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (or create) the database at `db_path` and run the schema.
    pub async fn open(db_path: PathBuf) -> Result<Self, StoreError> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(StoreError::backend)?;
            }
        }

        let conn = tokio::task::spawn_blocking(move || {
            let conn = Connection::open(&db_path).map_err(StoreError::backend)?;
            conn.execute_batch(SCHEMA).map_err(StoreError::backend)?;
            Ok::<_, StoreError>(conn)
        })
        .await
        .map_err(StoreError::backend)??;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }
}

fn parse_recurrence(s: &str) -> Option<RecurrenceType> {
    match s {
        "daily" => Some(RecurrenceType::Daily),
        "weekly" => Some(RecurrenceType::Weekly),
        "monthly" => Some(RecurrenceType::Monthly),
        _ => None,
    }
}

fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|d| d.with_timezone(&Utc))
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    let id: String = row.get(0)?;
    let created_at: String = row.get(4)?;
    let updated_at: String = row.get(5)?;
    Ok(User {
        id: Uuid::parse_str(&id).unwrap_or_default(),
        name: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        created_at: parse_timestamp(&created_at),
        updated_at: parse_timestamp(&updated_at),
    })
}

fn task_from_row(row: &Row<'_>) -> rusqlite::Result<Task> {
    let id: String = row.get(0)?;
    let owner_id: String = row.get(1)?;
    let recurrence_type: Option<String> = row.get(6)?;
    let recurrence_days: String = row.get(7)?;
    let tags: String = row.get(8)?;
    let scheduled_date: Option<String> = row.get(10)?;
    let created_at: String = row.get(11)?;
    let updated_at: String = row.get(12)?;

    Ok(Task {
        id: Uuid::parse_str(&id).unwrap_or_default(),
        owner_id: Uuid::parse_str(&owner_id).unwrap_or_default(),
        title: row.get(2)?,
        description: row.get(3)?,
        card_color: row.get(4)?,
        is_recurring: row.get::<_, i32>(5)? != 0,
        recurrence_type: recurrence_type.as_deref().and_then(parse_recurrence),
        recurrence_days: serde_json::from_str(&recurrence_days).unwrap_or_default(),
        tags: serde_json::from_str(&tags).unwrap_or_default(),
        is_completed: row.get::<_, i32>(9)? != 0,
        scheduled_date: scheduled_date.as_deref().map(parse_timestamp),
        created_at: parse_timestamp(&created_at),
        updated_at: parse_timestamp(&updated_at),
    })
}

/// Compile a query descriptor into a WHERE clause and its parameters.
fn compile_filter(query: &TaskQuery) -> (String, Vec<Value>) {
    let mut clause = String::from("owner_id = ?");
    let mut params: Vec<Value> = vec![Value::Text(query.owner_id.to_string())];

    match &query.filter {
        TaskFilter::All => {}
        TaskFilter::TitleContains(term) => {
            clause.push_str(" AND title LIKE ?");
            params.push(Value::Text(format!("%{}%", term)));
        }
        TaskFilter::ScheduledWithin { start, end } => {
            clause.push_str(
                " AND scheduled_date IS NOT NULL AND scheduled_date >= ? AND scheduled_date <= ?",
            );
            params.push(Value::Text(start.to_rfc3339()));
            params.push(Value::Text(end.to_rfc3339()));
        }
        TaskFilter::DueOn {
            start,
            end,
            weekday,
            day_of_month,
        } => {
            clause.push_str(
                " AND ((scheduled_date IS NOT NULL AND scheduled_date >= ? AND scheduled_date <= ?) \
                 OR (is_recurring = 1 AND (recurrence_type = 'daily' \
                 OR (recurrence_type = 'weekly' AND EXISTS (\
                     SELECT 1 FROM json_each(tasks.recurrence_days) WHERE json_each.value = ?)) \
                 OR (recurrence_type = 'monthly' AND scheduled_date IS NOT NULL \
                     AND CAST(strftime('%d', scheduled_date) AS INTEGER) = ?))))",
            );
            params.push(Value::Text(start.to_rfc3339()));
            params.push(Value::Text(end.to_rfc3339()));
            params.push(Value::Text(weekday.as_str().to_string()));
            params.push(Value::Integer(*day_of_month as i64));
        }
    }

    (clause, params)
}

fn order_clause(sort: TaskSort) -> &'static str {
    match sort {
        TaskSort::Unsorted => "",
        TaskSort::ScheduledDescTitleAsc => " ORDER BY scheduled_date DESC, title ASC",
        TaskSort::ScheduledAscDatelessLast => {
            " ORDER BY scheduled_date IS NULL, scheduled_date ASC, title ASC"
        }
    }
}

#[async_trait]
impl Store for SqliteStore {
    fn is_persistent(&self) -> bool {
        true
    }

    async fn insert_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, StoreError> {
        let conn = self.conn.clone();
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: now,
            updated_at: now,
        };
        let row = user.clone();

        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            let result = conn.execute(
                "INSERT INTO users (id, name, email, password_hash, created_at, updated_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    row.id.to_string(),
                    row.name,
                    row.email,
                    row.password_hash,
                    row.created_at.to_rfc3339(),
                    row.updated_at.to_rfc3339(),
                ],
            );
            match result {
                Ok(_) => Ok(()),
                Err(rusqlite::Error::SqliteFailure(e, _))
                    if e.code == rusqlite::ErrorCode::ConstraintViolation =>
                {
                    Err(StoreError::Duplicate("email"))
                }
                Err(e) => Err(StoreError::backend(e)),
            }
        })
        .await
        .map_err(StoreError::backend)??;

        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let conn = self.conn.clone();
        let email = email.to_string();

        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            conn.query_row(
                "SELECT id, name, email, password_hash, created_at, updated_at \
                 FROM users WHERE email = ?1",
                params![email],
                user_from_row,
            )
            .optional()
            .map_err(StoreError::backend)
        })
        .await
        .map_err(StoreError::backend)?
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let conn = self.conn.clone();
        let id = id.to_string();

        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            conn.query_row(
                "SELECT id, name, email, password_hash, created_at, updated_at \
                 FROM users WHERE id = ?1",
                params![id],
                user_from_row,
            )
            .optional()
            .map_err(StoreError::backend)
        })
        .await
        .map_err(StoreError::backend)?
    }

    async fn insert_task(&self, owner_id: Uuid, task: &ValidTask) -> Result<Task, StoreError> {
        let conn = self.conn.clone();
        let now = Utc::now();
        let record = Task {
            id: Uuid::new_v4(),
            owner_id,
            title: task.title.clone(),
            description: task.description.clone(),
            card_color: task.card_color.clone(),
            is_recurring: task.is_recurring,
            recurrence_type: task.recurrence_type,
            recurrence_days: task.recurrence_days.clone(),
            tags: task.tags.clone(),
            is_completed: false,
            scheduled_date: task.scheduled_date,
            created_at: now,
            updated_at: now,
        };
        let row = record.clone();

        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            let recurrence_days =
                serde_json::to_string(&row.recurrence_days).map_err(StoreError::backend)?;
            let tags = serde_json::to_string(&row.tags).map_err(StoreError::backend)?;
            let result = conn.execute(
                "INSERT INTO tasks (id, owner_id, title, description, card_color, is_recurring, \
                 recurrence_type, recurrence_days, tags, is_completed, scheduled_date, \
                 created_at, updated_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
                params![
                    row.id.to_string(),
                    row.owner_id.to_string(),
                    row.title,
                    row.description,
                    row.card_color,
                    row.is_recurring as i32,
                    row.recurrence_type.map(|t| t.as_str()),
                    recurrence_days,
                    tags,
                    row.is_completed as i32,
                    row.scheduled_date.map(|d| d.to_rfc3339()),
                    row.created_at.to_rfc3339(),
                    row.updated_at.to_rfc3339(),
                ],
            );
            match result {
                Ok(_) => Ok(()),
                Err(rusqlite::Error::SqliteFailure(e, _))
                    if e.code == rusqlite::ErrorCode::ConstraintViolation =>
                {
                    Err(StoreError::Duplicate("task title"))
                }
                Err(e) => Err(StoreError::backend(e)),
            }
        })
        .await
        .map_err(StoreError::backend)??;

        Ok(record)
    }

    async fn find_task_by_title(
        &self,
        owner_id: Uuid,
        title: &str,
    ) -> Result<Option<Task>, StoreError> {
        let conn = self.conn.clone();
        let owner_id = owner_id.to_string();
        let title = title.to_string();

        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            conn.query_row(
                &format!(
                    "SELECT {} FROM tasks WHERE owner_id = ?1 AND title = ?2",
                    TASK_COLUMNS
                ),
                params![owner_id, title],
                task_from_row,
            )
            .optional()
            .map_err(StoreError::backend)
        })
        .await
        .map_err(StoreError::backend)?
    }

    async fn count_tasks(&self, query: &TaskQuery) -> Result<u64, StoreError> {
        let conn = self.conn.clone();
        let (clause, values) = compile_filter(query);

        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            let sql = format!("SELECT COUNT(*) FROM tasks WHERE {}", clause);
            conn.query_row(&sql, params_from_iter(values), |row| {
                row.get::<_, i64>(0)
            })
            .map(|n| n as u64)
            .map_err(StoreError::backend)
        })
        .await
        .map_err(StoreError::backend)?
    }

    async fn find_tasks(&self, query: &TaskQuery) -> Result<Vec<Task>, StoreError> {
        let conn = self.conn.clone();
        let (clause, mut values) = compile_filter(query);
        let mut sql = format!(
            "SELECT {} FROM tasks WHERE {}{}",
            TASK_COLUMNS,
            clause,
            order_clause(query.sort)
        );
        match query.limit {
            Some(limit) => {
                sql.push_str(" LIMIT ? OFFSET ?");
                values.push(Value::Integer(limit as i64));
                values.push(Value::Integer(query.skip as i64));
            }
            None if query.skip > 0 => {
                sql.push_str(" LIMIT -1 OFFSET ?");
                values.push(Value::Integer(query.skip as i64));
            }
            None => {}
        }

        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            let mut stmt = conn.prepare(&sql).map_err(StoreError::backend)?;
            let tasks = stmt
                .query_map(params_from_iter(values), task_from_row)
                .map_err(StoreError::backend)?
                .collect::<Result<Vec<_>, _>>()
                .map_err(StoreError::backend)?;
            Ok(tasks)
        })
        .await
        .map_err(StoreError::backend)?
    }

    async fn set_task_completion(
        &self,
        owner_id: Uuid,
        task_id: Uuid,
        is_completed: bool,
    ) -> Result<Option<Task>, StoreError> {
        let conn = self.conn.clone();
        let owner = owner_id.to_string();
        let id = task_id.to_string();
        let now = Utc::now().to_rfc3339();

        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            // Single ownership-scoped update; concurrent toggles resolve
            // last-write-wins.
            let changed = conn
                .execute(
                    "UPDATE tasks SET is_completed = ?1, updated_at = ?2 \
                     WHERE id = ?3 AND owner_id = ?4",
                    params![is_completed as i32, now, id, owner],
                )
                .map_err(StoreError::backend)?;
            if changed == 0 {
                return Ok(None);
            }
            conn.query_row(
                &format!("SELECT {} FROM tasks WHERE id = ?1", TASK_COLUMNS),
                params![id],
                task_from_row,
            )
            .optional()
            .map_err(StoreError::backend)
        })
        .await
        .map_err(StoreError::backend)?
    }
}
