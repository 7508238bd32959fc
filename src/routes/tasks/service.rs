use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use super::model::{NewTask, Pagination, StatusFilter, Task, TaskChanges, TaskPage};
use crate::store::{StoreError, TaskStore};

#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    #[error("{0}")]
    Validation(String),

    /// Covers both a missing task and someone else's task.
    #[error("task not found or unauthorized")]
    NotFoundOrForbidden,

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for TaskError {
    fn from(err: StoreError) -> Self {
        TaskError::Internal(err.to_string())
    }
}

pub type TaskResult<T> = Result<T, TaskError>;

/// Owner-scoped task operations.
#[derive(Clone)]
pub struct TaskService {
    store: Arc<dyn TaskStore>,
}

impl TaskService {
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self { store }
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        user_id: Uuid,
        pagination: Pagination,
        filter: StatusFilter,
    ) -> TaskResult<TaskPage> {
        let (tasks, total) = self.store.list(user_id, pagination, filter).await?;
        Ok(TaskPage {
            tasks,
            total,
            total_pages: pagination.total_pages(total),
        })
    }

    #[instrument(skip(self))]
    pub async fn get(&self, user_id: Uuid, task_id: Uuid) -> TaskResult<Task> {
        self.store
            .get(user_id, task_id)
            .await?
            .ok_or(TaskError::NotFoundOrForbidden)
    }

    #[instrument(skip(self, task), fields(title = %task.title))]
    pub async fn create(&self, user_id: Uuid, task: NewTask) -> TaskResult<Task> {
        let task = self.store.create(user_id, task).await?;
        tracing::debug!(task_id = %task.id, "task created");
        Ok(task)
    }

    #[instrument(skip(self, changes))]
    pub async fn update(&self, user_id: Uuid, task_id: Uuid, changes: TaskChanges) -> TaskResult<()> {
        if !self.store.update(user_id, task_id, changes).await? {
            return Err(TaskError::NotFoundOrForbidden);
        }
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, user_id: Uuid, task_id: Uuid) -> TaskResult<()> {
        if !self.store.delete(user_id, task_id).await? {
            return Err(TaskError::NotFoundOrForbidden);
        }
        Ok(())
    }
}
