use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{email_in_use, TaskRepository, UserRepository};
use crate::error::AppError;
use crate::models::{NewTask, NewUser, Task, TaskInput, TaskQuery, User};

/// Process-local user store, used by tests and when no database is configured.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<Vec<User>>,
}

/// Process-local task store. Tasks are kept in insertion order.
#[derive(Default)]
pub struct InMemoryTaskRepository {
    tasks: RwLock<Vec<Task>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl InMemoryTaskRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, AppError> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email.eq_ignore_ascii_case(&user.email)) {
            return Err(email_in_use());
        }
        let user = User::new(user);
        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.email.eq_ignore_ascii_case(email)).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn create(&self, owner: Uuid, task: NewTask) -> Result<Task, AppError> {
        let task = Task::new(task, owner);
        self.tasks.write().await.push(task.clone());
        Ok(task)
    }

    async fn list(&self, owner: Uuid, query: &TaskQuery) -> Result<Vec<Task>, AppError> {
        let mut found: Vec<Task> = self
            .tasks
            .read()
            .await
            .iter()
            .filter(|t| t.user_id == owner && query.matches(t))
            .cloned()
            .collect();
        query.sort(&mut found);
        Ok(found)
    }

    async fn update(&self, owner: Uuid, id: Uuid, changes: TaskInput) -> Result<Task, AppError> {
        let mut tasks = self.tasks.write().await;
        let task = tasks
            .iter_mut()
            .find(|t| t.id == id && t.user_id == owner)
            .ok_or_else(AppError::task_not_found)?;
        task.apply(changes)?;
        Ok(task.clone())
    }

    async fn delete(&self, owner: Uuid, id: Uuid) -> Result<(), AppError> {
        let mut tasks = self.tasks.write().await;
        let position = tasks
            .iter()
            .position(|t| t.id == id && t.user_id == owner)
            .ok_or_else(AppError::task_not_found)?;
        tasks.remove(position);
        Ok(())
    }
}
