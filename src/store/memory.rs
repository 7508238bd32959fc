use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{StoreError, StoreResult, TaskStore, UserStore};
use crate::auth::credentials::{NewUser, User};
use crate::routes::tasks::model::{NewTask, Pagination, StatusFilter, Task, TaskChanges};

/// In-process store for tests and runs without a database.
///
/// Tasks are kept in a `Vec` so iteration order is insertion order.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

#[derive(Debug, Default)]
struct Inner {
    users: HashMap<Uuid, User>,
    tasks: Vec<Task>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let mut inner = self.inner.write().await;

        if inner.users.values().any(|u| u.name == user.name) {
            return Err(StoreError::Duplicate);
        }

        let user = User {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            created_at: Utc::now(),
        };
        inner.users.insert(user.id, user.clone());

        tracing::debug!(user_id = %user.id, "created user");
        Ok(user)
    }

    async fn find_by_name(&self, name: &str) -> StoreResult<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.values().find(|u| u.name == name).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.get(&id).cloned())
    }

    async fn delete_user(&self, id: Uuid) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;
        if inner.users.remove(&id).is_none() {
            return Ok(false);
        }
        inner.tasks.retain(|t| t.user_id != id);
        Ok(true)
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn list(
        &self,
        user_id: Uuid,
        pagination: Pagination,
        filter: StatusFilter,
    ) -> StoreResult<(Vec<Task>, u64)> {
        let inner = self.inner.read().await;

        let matching: Vec<&Task> = inner
            .tasks
            .iter()
            .filter(|t| t.user_id == user_id && filter.matches(t.status))
            .collect();

        let total = matching.len() as u64;
        let offset = usize::try_from(pagination.offset()).unwrap_or(usize::MAX);
        let tasks = matching
            .into_iter()
            .skip(offset)
            .take(pagination.per_page() as usize)
            .cloned()
            .collect();

        Ok((tasks, total))
    }

    async fn get(&self, user_id: Uuid, id: Uuid) -> StoreResult<Option<Task>> {
        let inner = self.inner.read().await;
        Ok(inner
            .tasks
            .iter()
            .find(|t| t.id == id && t.user_id == user_id)
            .cloned())
    }

    async fn create(&self, user_id: Uuid, task: NewTask) -> StoreResult<Task> {
        let mut inner = self.inner.write().await;

        if !inner.users.contains_key(&user_id) {
            return Err(StoreError::Database(format!("user {user_id} does not exist")));
        }

        let task = Task {
            id: Uuid::new_v4(),
            title: task.title,
            description: task.description,
            status: task.status,
            due_date: task.due_date,
            user_id,
            created_at: Utc::now(),
        };
        inner.tasks.push(task.clone());

        Ok(task)
    }

    async fn update(&self, user_id: Uuid, id: Uuid, changes: TaskChanges) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;
        match inner
            .tasks
            .iter_mut()
            .find(|t| t.id == id && t.user_id == user_id)
        {
            Some(task) => {
                changes.apply(task);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;
        let before = inner.tasks.len();
        inner.tasks.retain(|t| !(t.id == id && t.user_id == user_id));
        Ok(inner.tasks.len() < before)
    }
}
