pub mod task;
pub mod user;

use serde::{Deserialize, Serialize};

pub use task::{NewTask, SortField, SortOrder, Task, TaskInput, TaskQuery, TaskStatus};
pub use user::{NewUser, User, UserProfile};

/// The `{success, message, data}` envelope every JSON success response uses,
/// except the dashboard.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    /// A success envelope without a payload.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
        }
    }
}
