use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::de::{self, IntoDeserializer};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::error::AppError;

const MISSING_FIELDS_MESSAGE: &str =
    "Please provide all mandatory fields: title, start time, priority, and status.";

/// Represents the status of a task.
/// Corresponds to the `task_status` SQL enum; both order `pending` before `finished`.
#[derive(
    Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, sqlx::Type,
)]
#[sqlx(type_name = "task_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Not yet finished.
    Pending,
    /// Done.
    Finished,
}

/// Request body for creating or updating a task.
///
/// Every field is optional at the type level: creation checks presence of the
/// mandatory ones in [`TaskInput::into_new_task`], updates treat absent fields as
/// "leave unchanged". Any `userId` the client sends is not part of this struct and
/// is dropped during deserialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TaskInput {
    /// Between 1 and 200 characters.
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,

    pub start_time: Option<DateTime<Utc>>,

    pub end_time: Option<DateTime<Utc>>,

    /// 1 (lowest) to 5 (highest).
    #[validate(range(min = 1, max = 5))]
    pub priority: Option<i16>,

    pub status: Option<TaskStatus>,

    /// Expected duration in minutes.
    #[validate(range(min = 1))]
    pub estimated_time: Option<i32>,
}

/// A fully validated task ready to be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTask {
    pub title: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub priority: i16,
    pub status: TaskStatus,
    pub estimated_time: Option<i32>,
}

/// Represents a task entity as stored and returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub priority: i16,
    pub status: TaskStatus,
    pub estimated_time: Option<i32>,
    /// Owner. Set from the authenticated caller at creation and never changed.
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields a task list can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    Title,
    StartTime,
    EndTime,
    Priority,
    Status,
    EstimatedTime,
    CreatedAt,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Query parameters for listing tasks.
///
/// `priority` and `status` are combined with AND. The listing is always
/// restricted to the caller's own tasks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskQuery {
    #[serde(default, deserialize_with = "parsed_or_none")]
    pub priority: Option<i16>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub status: Option<TaskStatus>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub sort_by: Option<SortField>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub order: Option<SortOrder>,
}

// `?status=` means "no status filter", not an unknown variant.
fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) if !raw.trim().is_empty() => {
            T::deserialize(IntoDeserializer::<D::Error>::into_deserializer(raw)).map(Some)
        }
        _ => Ok(None),
    }
}

fn parsed_or_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) if !raw.trim().is_empty() => {
            raw.trim().parse().map(Some).map_err(de::Error::custom)
        }
        _ => Ok(None),
    }
}

fn check_title(title: &str) -> Result<(), AppError> {
    if title.trim().is_empty() {
        return Err(AppError::ValidationFailed("Title must not be blank.".into()));
    }
    Ok(())
}

fn check_time_range(
    start_time: DateTime<Utc>,
    end_time: Option<DateTime<Utc>>,
) -> Result<(), AppError> {
    match end_time {
        Some(end) if end < start_time => Err(AppError::ValidationFailed(
            "End time must not be earlier than start time.".into(),
        )),
        _ => Ok(()),
    }
}

impl TaskInput {
    /// Checks presence of the mandatory fields and the value rules, producing a
    /// storable task.
    pub fn into_new_task(self) -> Result<NewTask, AppError> {
        self.validate()?;

        let (title, start_time, priority, status) =
            match (self.title, self.start_time, self.priority, self.status) {
                (Some(title), Some(start_time), Some(priority), Some(status)) => {
                    (title, start_time, priority, status)
                }
                _ => return Err(AppError::ValidationFailed(MISSING_FIELDS_MESSAGE.into())),
            };

        check_title(&title)?;
        check_time_range(start_time, self.end_time)?;

        Ok(NewTask {
            title,
            start_time,
            end_time: self.end_time,
            priority,
            status,
            estimated_time: self.estimated_time,
        })
    }

    /// Validates the fields present in a partial update.
    ///
    /// The start/end ordering can only be checked here when both are present;
    /// [`Task::apply`] re-checks it against the merged task.
    pub fn validate_changes(&self) -> Result<(), AppError> {
        self.validate()?;
        if let Some(title) = &self.title {
            check_title(title)?;
        }
        if let Some(start_time) = self.start_time {
            check_time_range(start_time, self.end_time)?;
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.start_time.is_none()
            && self.end_time.is_none()
            && self.priority.is_none()
            && self.status.is_none()
            && self.estimated_time.is_none()
    }
}

impl Task {
    /// Creates a new `Task` owned by `user_id`, with a fresh id and timestamps.
    pub fn new(input: NewTask, user_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: input.title,
            start_time: input.start_time,
            end_time: input.end_time,
            priority: input.priority,
            status: input.status,
            estimated_time: input.estimated_time,
            user_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies a partial update in place. The task is left untouched on error.
    pub fn apply(&mut self, changes: TaskInput) -> Result<(), AppError> {
        changes.validate_changes()?;

        let start_time = changes.start_time.unwrap_or(self.start_time);
        let end_time = changes.end_time.or(self.end_time);
        check_time_range(start_time, end_time)?;

        if let Some(title) = changes.title {
            self.title = title;
        }
        self.start_time = start_time;
        self.end_time = end_time;
        if let Some(priority) = changes.priority {
            self.priority = priority;
        }
        if let Some(status) = changes.status {
            self.status = status;
        }
        if let Some(estimated_time) = changes.estimated_time {
            self.estimated_time = Some(estimated_time);
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Compares two tasks on a single sortable field, ascending.
    pub fn cmp_by(&self, other: &Task, field: SortField) -> Ordering {
        match field {
            SortField::Title => self.title.cmp(&other.title),
            SortField::StartTime => self.start_time.cmp(&other.start_time),
            SortField::EndTime => self.end_time.cmp(&other.end_time),
            SortField::Priority => self.priority.cmp(&other.priority),
            SortField::Status => self.status.cmp(&other.status),
            SortField::EstimatedTime => self.estimated_time.cmp(&other.estimated_time),
            SortField::CreatedAt => self.created_at.cmp(&other.created_at),
        }
    }
}

impl SortField {
    /// Column name in the `tasks` table.
    pub fn column(&self) -> &'static str {
        match self {
            SortField::Title => "title",
            SortField::StartTime => "start_time",
            SortField::EndTime => "end_time",
            SortField::Priority => "priority",
            SortField::Status => "status",
            SortField::EstimatedTime => "estimated_time",
            SortField::CreatedAt => "created_at",
        }
    }
}

impl TaskQuery {
    pub fn matches(&self, task: &Task) -> bool {
        self.priority.map_or(true, |p| task.priority == p)
            && self.status.map_or(true, |s| task.status == s)
    }

    /// Sorts `tasks` in place according to `sort_by`/`order`. No-op without `sort_by`.
    pub fn sort(&self, tasks: &mut [Task]) {
        if let Some(field) = self.sort_by {
            let descending = self.order.unwrap_or_default() == SortOrder::Desc;
            tasks.sort_by(|a, b| {
                let ordering = a.cmp_by(b, field);
                if descending {
                    ordering.reverse()
                } else {
                    ordering
                }
            });
        }
    }
}
