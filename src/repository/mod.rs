//! Storage abstraction.
//!
//! Handlers and the access guard talk to [`UserRepository`] and [`TaskRepository`]
//! only. Every task operation takes the owner's id, and a task whose id matches but
//! whose owner does not is reported exactly like a missing one.

pub mod memory;
pub mod postgres;

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{NewTask, NewUser, Task, TaskInput, TaskQuery, User};

pub use memory::{InMemoryTaskRepository, InMemoryUserRepository};
pub use postgres::{PgTaskRepository, PgUserRepository};

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Stores a new user. Fails with `Conflict` when the email is taken.
    async fn create(&self, user: NewUser) -> Result<User, AppError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError>;
}

#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn create(&self, owner: Uuid, task: NewTask) -> Result<Task, AppError>;

    /// Returns the owner's tasks matching `query`, possibly none.
    async fn list(&self, owner: Uuid, query: &TaskQuery) -> Result<Vec<Task>, AppError>;

    /// Applies `changes` to the task with `id` owned by `owner`.
    ///
    /// Callers check the fields with [`TaskInput::validate_changes`] first; the
    /// backend only re-checks the start/end ordering against the stored task.
    async fn update(&self, owner: Uuid, id: Uuid, changes: TaskInput) -> Result<Task, AppError>;

    async fn delete(&self, owner: Uuid, id: Uuid) -> Result<(), AppError>;
}

pub(crate) fn email_in_use() -> AppError {
    AppError::Conflict("Registration failed. Email is already in use.".into())
}

/// Runs a storage call with an upper bound on how long it may take.
pub async fn bounded<T, F>(limit: Duration, operation: &str, call: F) -> Result<T, AppError>
where
    F: Future<Output = Result<T, AppError>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(AppError::Internal(format!(
            "storage call `{}` timed out after {:?}",
            operation, limit
        ))),
    }
}
