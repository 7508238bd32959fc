//! Storage seams for users and tasks.
//!
//! Every task method takes the owning `user_id` and scopes its query to it,
//! so a task that exists but belongs to someone else looks exactly like a
//! task that does not exist.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::auth::credentials::{NewUser, User};
use crate::routes::tasks::model::{NewTask, Pagination, StatusFilter, Task, TaskChanges};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record already exists")]
    Duplicate,

    #[error("database error: {0}")]
    Database(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `StoreError::Duplicate` when the name is taken.
    async fn create_user(&self, user: NewUser) -> StoreResult<User>;

    async fn find_by_name(&self, name: &str) -> StoreResult<Option<User>>;

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;

    /// Removes the user together with all of their tasks.
    async fn delete_user(&self, id: Uuid) -> StoreResult<bool>;
}

#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Returns one page in insertion order plus the filtered total.
    async fn list(
        &self,
        user_id: Uuid,
        pagination: Pagination,
        filter: StatusFilter,
    ) -> StoreResult<(Vec<Task>, u64)>;

    async fn get(&self, user_id: Uuid, id: Uuid) -> StoreResult<Option<Task>>;

    async fn create(&self, user_id: Uuid, task: NewTask) -> StoreResult<Task>;

    /// Returns `false` when no task `id` is owned by `user_id`.
    async fn update(&self, user_id: Uuid, id: Uuid, changes: TaskChanges) -> StoreResult<bool>;

    /// Returns `false` when no task `id` is owned by `user_id`.
    async fn delete(&self, user_id: Uuid, id: Uuid) -> StoreResult<bool>;
}
