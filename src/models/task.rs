use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Represents a task entity as stored in the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique identifier for the task (UUID v4).
    pub id: Uuid,
    /// The title of the task. Never empty.
    pub title: String,
    /// An optional description for the task.
    pub description: Option<String>,
    /// Whether the task is done.
    pub completed: bool,
    /// Identifier of the user who owns the task.
    pub user_id: Uuid,
    /// Timestamp of when the task was created.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last update to the task.
    pub updated_at: DateTime<Utc>,
}

/// The owning user's public fields, embedded in task responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
}

/// A task together with its owner's summary, as returned by every task endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskWithOwner {
    #[serde(flatten)]
    pub task: Task,
    pub user: UserSummary,
}

/// Request body for `POST /api/task`.
///
/// Required fields are `Option` so their absence surfaces as a field error from `validate()`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskInput {
    #[validate(
        required(message = "Required"),
        length(min = 1, message = "Title is required")
    )]
    pub title: Option<String>,
    pub description: Option<String>,
    /// Defaults to `false` when omitted.
    #[serde(default)]
    pub completed: bool,
    /// Kept as a string so a non-UUID value reads as "no such user" rather than a parse error.
    #[validate(
        required(message = "Required"),
        length(min = 1, message = "User ID is required")
    )]
    pub user_id: Option<String>,
}

/// Request body for `PUT /api/task/{id}`. Every field is optional; the owner cannot change.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateTaskInput {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
}

/// A validated task ready to be inserted, with its owner already resolved.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub user_id: Uuid,
}

impl NewTask {
    /// Creates a `NewTask` with a fresh UUID v4 for the owner `user_id`.
    pub fn new(title: String, description: Option<String>, completed: bool, user_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            title,
            description,
            completed,
            user_id,
        }
    }
}

/// A partial update to a task. `None` means "leave as is".
#[derive(Debug, Clone, Default)]
pub struct TaskChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
}

impl From<UpdateTaskInput> for TaskChanges {
    fn from(input: UpdateTaskInput) -> Self {
        Self {
            title: input.title,
            description: input.description,
            completed: input.completed,
        }
    }
}
