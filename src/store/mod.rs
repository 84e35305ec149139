//! Persistence gateway.
//!
//! [`Store`] is the typed CRUD façade every handler talks to. Two backends implement it:
//! [`postgres::PgStore`] for production and [`memory::MemoryStore`] for tests and
//! database-free local runs. Both report failures through [`StoreError`], so handlers
//! never see driver-specific errors.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    NewTask, NewUser, TaskChanges, TaskWithOwner, User, UserChanges, UserWithTasks,
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Failures reported by a [`Store`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// The row targeted by an update or delete does not exist.
    #[error("record not found")]
    NotFound,
    /// A unique constraint rejected the write.
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),
    /// A foreign key constraint rejected the write.
    #[error("foreign key constraint violated: {0}")]
    ForeignKeyViolation(String),
    /// Any other driver or connectivity failure.
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
}

/// Typed CRUD over users and tasks, including one-hop relation loading.
///
/// Lookups return `Ok(None)` for a missing row; updates and deletes return
/// [`StoreError::NotFound`] instead. Deleting a user also deletes their tasks.
#[async_trait]
pub trait Store: Send + Sync {
    /// All users with their tasks, oldest first.
    async fn list_users(&self) -> Result<Vec<UserWithTasks>, StoreError>;
    async fn find_user(&self, id: Uuid) -> Result<Option<UserWithTasks>, StoreError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn user_exists(&self, id: Uuid) -> Result<bool, StoreError>;
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError>;
    async fn update_user(&self, id: Uuid, changes: UserChanges) -> Result<User, StoreError>;
    async fn delete_user(&self, id: Uuid) -> Result<(), StoreError>;

    /// All tasks with their owner summaries, oldest first.
    async fn list_tasks(&self) -> Result<Vec<TaskWithOwner>, StoreError>;
    async fn find_task(&self, id: Uuid) -> Result<Option<TaskWithOwner>, StoreError>;
    async fn tasks_for_user(&self, user_id: Uuid) -> Result<Vec<TaskWithOwner>, StoreError>;
    async fn create_task(&self, task: NewTask) -> Result<TaskWithOwner, StoreError>;
    async fn update_task(&self, id: Uuid, changes: TaskChanges)
        -> Result<TaskWithOwner, StoreError>;
    async fn delete_task(&self, id: Uuid) -> Result<(), StoreError>;
}
