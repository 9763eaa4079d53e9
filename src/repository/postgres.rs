use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use super::{bounded, email_in_use, TaskRepository, UserRepository};
use crate::error::AppError;
use crate::models::{NewTask, NewUser, SortOrder, Task, TaskInput, TaskQuery, User};

const USER_COLUMNS: &str = "id, name, email, password_hash, created_at";
const TASK_COLUMNS: &str =
    "id, title, start_time, end_time, priority, status, estimated_time, user_id, created_at, updated_at";

/// Opens a connection pool whose acquire wait is bounded by `timeout`.
pub async fn connect(database_url: &str, timeout: Duration) -> Result<PgPool, AppError> {
    PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(timeout)
        .connect(database_url)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to connect to database: {}", e)))
}

/// Applies the schema in `migrations/`.
pub async fn run_migrations(pool: &PgPool) -> Result<(), AppError> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to run migrations: {}", e)))
}

const TIME_RANGE_CONSTRAINT: &str = "tasks_time_range";

// `tasks_time_range` only fires here when a partial update moves the start past
// an existing end; field rules are checked before the query.
fn map_task_error(error: sqlx::Error) -> AppError {
    match &error {
        sqlx::Error::Database(db) if db.constraint() == Some(TIME_RANGE_CONSTRAINT) => {
            AppError::ValidationFailed("End time must not be earlier than start time.".into())
        }
        _ => error.into(),
    }
}

pub struct PgUserRepository {
    pool: PgPool,
    timeout: Duration,
}

impl PgUserRepository {
    pub fn new(pool: PgPool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, AppError> {
        let user = User::new(user);
        let sql = format!(
            "INSERT INTO users ({USER_COLUMNS}) VALUES ($1, $2, $3, $4, $5) RETURNING {USER_COLUMNS}"
        );
        bounded(self.timeout, "users.create", async {
            sqlx::query_as::<_, User>(&sql)
                .bind(user.id)
                .bind(&user.name)
                .bind(&user.email)
                .bind(&user.password_hash)
                .bind(user.created_at)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| match AppError::from(e) {
                    AppError::Conflict(_) => email_in_use(),
                    other => other,
                })
        })
        .await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE lower(email) = lower($1)");
        bounded(self.timeout, "users.find_by_email", async {
            sqlx::query_as::<_, User>(&sql)
                .bind(email)
                .fetch_optional(&self.pool)
                .await
                .map_err(AppError::from)
        })
        .await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        bounded(self.timeout, "users.find_by_id", async {
            sqlx::query_as::<_, User>(&sql)
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(AppError::from)
        })
        .await
    }
}

pub struct PgTaskRepository {
    pool: PgPool,
    timeout: Duration,
}

impl PgTaskRepository {
    pub fn new(pool: PgPool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }
}

/// Builds the listing query for `query`. Bind order is: owner, then `status`
/// and `priority` when present.
fn list_sql(query: &TaskQuery) -> String {
    let mut sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE user_id = $1");
    let mut param_count = 2;

    if query.status.is_some() {
        sql.push_str(&format!(" AND status = ${}", param_count));
        param_count += 1;
    }
    if query.priority.is_some() {
        sql.push_str(&format!(" AND priority = ${}", param_count));
    }

    // Column names come from a closed enum, never from the request text.
    match query.sort_by {
        Some(field) => {
            let direction = match query.order.unwrap_or_default() {
                SortOrder::Asc => "ASC NULLS FIRST",
                SortOrder::Desc => "DESC NULLS LAST",
            };
            let collation = if field.column() == "title" { " COLLATE \"C\"" } else { "" };
            sql.push_str(&format!(
                " ORDER BY {}{} {}, created_at ASC",
                field.column(),
                collation,
                direction
            ));
        }
        None => sql.push_str(" ORDER BY created_at ASC"),
    }
    sql
}

#[async_trait]
impl TaskRepository for PgTaskRepository {
    async fn create(&self, owner: Uuid, task: NewTask) -> Result<Task, AppError> {
        let task = Task::new(task, owner);
        let sql = format!(
            "INSERT INTO tasks ({TASK_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING {TASK_COLUMNS}"
        );
        bounded(self.timeout, "tasks.create", async {
            sqlx::query_as::<_, Task>(&sql)
                .bind(task.id)
                .bind(&task.title)
                .bind(task.start_time)
                .bind(task.end_time)
                .bind(task.priority)
                .bind(task.status)
                .bind(task.estimated_time)
                .bind(task.user_id)
                .bind(task.created_at)
                .bind(task.updated_at)
                .fetch_one(&self.pool)
                .await
                .map_err(map_task_error)
        })
        .await
    }

    async fn list(&self, owner: Uuid, query: &TaskQuery) -> Result<Vec<Task>, AppError> {
        let sql = list_sql(query);
        bounded(self.timeout, "tasks.list", async {
            let mut query_builder = sqlx::query_as::<_, Task>(&sql).bind(owner);
            if let Some(status) = query.status {
                query_builder = query_builder.bind(status);
            }
            if let Some(priority) = query.priority {
                query_builder = query_builder.bind(priority);
            }
            query_builder
                .fetch_all(&self.pool)
                .await
                .map_err(AppError::from)
        })
        .await
    }

    async fn update(&self, owner: Uuid, id: Uuid, changes: TaskInput) -> Result<Task, AppError> {
        let sql = format!(
            "UPDATE tasks SET \
                title = COALESCE($3, title), \
                start_time = COALESCE($4, start_time), \
                end_time = COALESCE($5, end_time), \
                priority = COALESCE($6, priority), \
                status = COALESCE($7, status), \
                estimated_time = COALESCE($8, estimated_time), \
                updated_at = now() \
             WHERE id = $1 AND user_id = $2 \
             RETURNING {TASK_COLUMNS}"
        );
        bounded(self.timeout, "tasks.update", async {
            sqlx::query_as::<_, Task>(&sql)
                .bind(id)
                .bind(owner)
                .bind(&changes.title)
                .bind(changes.start_time)
                .bind(changes.end_time)
                .bind(changes.priority)
                .bind(changes.status)
                .bind(changes.estimated_time)
                .fetch_optional(&self.pool)
                .await
                .map_err(map_task_error)
                .and_then(|row| row.ok_or_else(AppError::task_not_found))
        })
        .await
    }

    async fn delete(&self, owner: Uuid, id: Uuid) -> Result<(), AppError> {
        bounded(self.timeout, "tasks.delete", async {
            let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
                .bind(id)
                .bind(owner)
                .execute(&self.pool)
                .await
                .map_err(AppError::from)?;

            if result.rows_affected() == 0 {
                return Err(AppError::task_not_found());
            }
            Ok::<(), AppError>(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SortField, TaskStatus};

    #[test]
    fn test_list_sql_is_owner_scoped() {
        let sql = list_sql(&TaskQuery::default());
        assert!(sql.contains("WHERE user_id = $1"));
        assert!(sql.ends_with("ORDER BY created_at ASC"));
    }

    #[test]
    fn test_list_sql_filters_and_sort() {
        let sql = list_sql(&TaskQuery {
            priority: Some(3),
            status: Some(TaskStatus::Pending),
            sort_by: Some(SortField::StartTime),
            order: Some(SortOrder::Desc),
        });

        assert!(sql.contains("AND status = $2"));
        assert!(sql.contains("AND priority = $3"));
        assert!(sql.contains("ORDER BY start_time DESC NULLS LAST, created_at ASC"));
    }

    #[test]
    fn test_list_sql_priority_only_uses_second_placeholder() {
        let sql = list_sql(&TaskQuery {
            priority: Some(1),
            ..TaskQuery::default()
        });
        assert!(sql.contains("AND priority = $2"));
        assert!(!sql.contains("$3"));
    }
}
