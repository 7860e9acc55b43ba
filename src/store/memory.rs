//! In-memory store (non-persistent).

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Store, StoreError};
use crate::model::{Task, User, ValidTask};
use crate::query::{TaskFilter, TaskQuery, TaskSort};
use crate::recurrence;

#[derive(Clone, Default)]
pub struct InMemoryStore {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
    tasks: Arc<RwLock<HashMap<Uuid, Task>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn matches(task: &Task, query: &TaskQuery) -> bool {
    if task.owner_id != query.owner_id {
        return false;
    }
    match &query.filter {
        TaskFilter::All => true,
        TaskFilter::TitleContains(term) => task
            .title
            .to_lowercase()
            .contains(&term.to_lowercase()),
        TaskFilter::ScheduledWithin { start, end } => task
            .scheduled_date
            .map(|d| d >= *start && d <= *end)
            .unwrap_or(false),
        TaskFilter::DueOn { start, end, .. } => {
            let dated_today = task
                .scheduled_date
                .map(|d| d >= *start && d <= *end)
                .unwrap_or(false);
            // Malformed recurrence rows never match, same as the SQL
            // predicate; they are not an error at query time.
            let due_recurring = task.is_recurring
                && recurrence::is_due(task, start.date_naive()).unwrap_or(false);
            dated_today || due_recurring
        }
    }
}

fn sort_tasks(tasks: &mut [Task], sort: TaskSort) {
    match sort {
        TaskSort::Unsorted => {}
        TaskSort::ScheduledDescTitleAsc => {
            // Option ordering puts None lowest, so descending leaves
            // dateless tasks at the end.
            tasks.sort_by(|a, b| {
                b.scheduled_date
                    .cmp(&a.scheduled_date)
                    .then_with(|| a.title.cmp(&b.title))
            });
        }
        TaskSort::ScheduledAscDatelessLast => {
            tasks.sort_by(|a, b| {
                let by_date = match (a.scheduled_date, b.scheduled_date) {
                    (Some(x), Some(y)) => x.cmp(&y),
                    (Some(_), None) => Ordering::Less,
                    (None, Some(_)) => Ordering::Greater,
                    (None, None) => Ordering::Equal,
                };
                by_date.then_with(|| a.title.cmp(&b.title))
            });
        }
    }
}

#[async_trait]
impl Store for InMemoryStore {
    fn is_persistent(&self) -> bool {
        false
    }

    async fn insert_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == email) {
            return Err(StoreError::Duplicate("email"));
        }
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: now,
            updated_at: now,
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn insert_task(&self, owner_id: Uuid, task: &ValidTask) -> Result<Task, StoreError> {
        let mut tasks = self.tasks.write().await;
        if tasks
            .values()
            .any(|t| t.owner_id == owner_id && t.title == task.title)
        {
            return Err(StoreError::Duplicate("task title"));
        }
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
        tasks.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_task_by_title(
        &self,
        owner_id: Uuid,
        title: &str,
    ) -> Result<Option<Task>, StoreError> {
        Ok(self
            .tasks
            .read()
            .await
            .values()
            .find(|t| t.owner_id == owner_id && t.title == title)
            .cloned())
    }

    async fn count_tasks(&self, query: &TaskQuery) -> Result<u64, StoreError> {
        let tasks = self.tasks.read().await;
        Ok(tasks.values().filter(|t| matches(t, query)).count() as u64)
    }

    async fn find_tasks(&self, query: &TaskQuery) -> Result<Vec<Task>, StoreError> {
        let mut matched: Vec<Task> = self
            .tasks
            .read()
            .await
            .values()
            .filter(|t| matches(t, query))
            .cloned()
            .collect();
        sort_tasks(&mut matched, query.sort);

        let matched = matched.into_iter().skip(query.skip as usize);
        Ok(match query.limit {
            Some(limit) => matched.take(limit as usize).collect(),
            None => matched.collect(),
        })
    }

    async fn set_task_completion(
        &self,
        owner_id: Uuid,
        task_id: Uuid,
        is_completed: bool,
    ) -> Result<Option<Task>, StoreError> {
        let mut tasks = self.tasks.write().await;
        match tasks.get_mut(&task_id) {
            Some(task) if task.owner_id == owner_id => {
                task.is_completed = is_completed;
                task.updated_at = Utc::now();
                Ok(Some(task.clone()))
            }
            _ => Ok(None),
        }
    }
}
