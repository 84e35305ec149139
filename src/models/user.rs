use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use super::task::Task;

/// Represents a user as returned by the API.
///
/// The password hash lives only in the store; this type has no field for it, so no
/// response can ever carry it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique identifier for the user (UUID v4).
    pub id: Uuid,
    /// Email address, unique across all users.
    pub email: String,
    /// Optional display name.
    pub name: Option<String>,
    /// Timestamp of when the user was created.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last update to the user.
    pub updated_at: DateTime<Utc>,
}

/// A user together with every task they own, as returned by the list and lookup endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserWithTasks {
    #[serde(flatten)]
    pub user: User,
    pub tasks: Vec<Task>,
}

/// Request body for `POST /api/user`.
///
/// `email` and `password` are `Option` only so that a missing field is reported by
/// `validate()` alongside the other field errors instead of failing deserialization.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserInput {
    #[validate(required(message = "Required"), email(message = "Invalid Email Format"))]
    pub email: Option<String>,
    #[validate(length(min = 2, message = "Name must be at least 2 characters"))]
    pub name: Option<String>,
    #[validate(
        required(message = "Required"),
        length(min = 6, message = "Password must be at least 6 characters")
    )]
    pub password: Option<String>, // plaintext, hashed before it reaches the store
}

/// Request body for `PUT /api/user/{id}`. Every field is optional; absent fields are left unchanged.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateUserInput {
    #[validate(email(message = "Invalid Email Format"))]
    pub email: Option<String>,
    #[validate(length(min = 2, message = "Name must be at least 2 characters"))]
    pub name: Option<String>,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: Option<String>,
}

/// A validated user ready to be inserted. Carries the password hash, never the plaintext.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub password_hash: String,
}

impl NewUser {
    /// Creates a `NewUser` with a fresh UUID v4 from an already computed hash.
    pub fn new(email: String, name: Option<String>, password_hash: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            email,
            name,
            password_hash,
        }
    }
}

/// A partial update to a user. `None` means "leave as is".
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub email: Option<String>,
    pub name: Option<String>,
    pub password_hash: Option<String>,
}
