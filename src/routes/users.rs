use crate::{
    error::AppError,
    models::{CreateUserInput, NewUser, UpdateUserInput, UserChanges},
    state::AppState,
    store::StoreError,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use log::{info, warn};
use uuid::Uuid;
use validator::Validate;

const EMAIL_TAKEN: &str = "Email already exists";
const USER_NOT_FOUND: &str = "User not found";

/// Parses a path segment as a user id, rejecting anything that is not a UUID.
fn parse_user_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::BadRequest("Invalid ID format".into()))
}

/// Retrieves every user together with their tasks.
///
/// ## Responses:
/// - `200 OK`: JSON array of users, each with a `tasks` array. Passwords are never included.
/// - `500 Internal Server Error`: For database errors.
#[get("")]
pub async fn get_users(state: web::Data<AppState>) -> Result<impl Responder, AppError> {
    let users = state
        .store
        .list_users()
        .await
        .map_err(|e| AppError::internal("Error fetching users", e))?;

    Ok(HttpResponse::Ok().json(users))
}

/// Retrieves a single user and their tasks.
///
/// ## Path Parameters:
/// - `id`: The UUID of the user.
///
/// ## Responses:
/// - `200 OK`: The user with a `tasks` array.
/// - `400 Bad Request`: If `id` is not a UUID.
/// - `404 Not Found`: If no user has that id.
/// - `500 Internal Server Error`: For database errors.
#[get("/{id}")]
pub async fn get_user(
    state: web::Data<AppState>,
    user_id: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let id = parse_user_id(&user_id)?;

    let user = state
        .store
        .find_user(id)
        .await
        .map_err(|e| AppError::internal("Error fetching user", e))?;

    match user {
        Some(user) => Ok(HttpResponse::Ok().json(user)),
        None => Err(AppError::NotFound(USER_NOT_FOUND.into())),
    }
}

/// Registers a new user.
///
/// ## Request Body:
/// - `email`: A valid, not yet registered email address.
/// - `name` (optional): At least 2 characters.
/// - `password`: At least 6 characters. Stored only as a bcrypt hash.
///
/// ## Responses:
/// - `201 Created`: The created user, without password.
/// - `400 Bad Request`: Validation failure, or the email is already registered.
/// - `500 Internal Server Error`: For database or hashing errors.
#[post("")]
pub async fn create_user(
    state: web::Data<AppState>,
    user_data: web::Json<CreateUserInput>,
) -> Result<impl Responder, AppError> {
    user_data.validate()?;
    let CreateUserInput {
        email,
        name,
        password,
    } = user_data.into_inner();
    let (Some(email), Some(password)) = (email, password) else {
        return Err(AppError::BadRequest("Email and password are required".into()));
    };

    let existing_user = state
        .store
        .find_user_by_email(&email)
        .await
        .map_err(|e| AppError::internal("Error creating user", e))?;

    if existing_user.is_some() {
        warn!("Rejected registration for already used email");
        return Err(AppError::Conflict(EMAIL_TAKEN.into()));
    }

    let password_hash = state.hasher.hash_off_thread(password).await?;

    // The unique constraint still catches a registration racing this one.
    let user = match state.store.create_user(NewUser::new(email, name, password_hash)).await {
        Ok(user) => user,
        Err(StoreError::UniqueViolation(_)) => return Err(AppError::Conflict(EMAIL_TAKEN.into())),
        Err(e) => return Err(AppError::internal("Error creating user", e)),
    };

    info!("Created user {}", user.id);
    Ok(HttpResponse::Created().json(user))
}

/// Applies a partial update to a user.
///
/// Fields missing from the body are left unchanged. A new password is re-hashed before it
/// is stored.
///
/// ## Responses:
/// - `200 OK`: The updated user, without password.
/// - `400 Bad Request`: Malformed id, validation failure, or the email belongs to another user.
/// - `404 Not Found`: If no user has that id.
/// - `500 Internal Server Error`: For database or hashing errors.
#[put("/{id}")]
pub async fn update_user(
    state: web::Data<AppState>,
    user_id: web::Path<String>,
    user_data: web::Json<UpdateUserInput>,
) -> Result<impl Responder, AppError> {
    let id = parse_user_id(&user_id)?;
    user_data.validate()?;
    let input = user_data.into_inner();

    if let Some(email) = &input.email {
        let owner = state
            .store
            .find_user_by_email(email)
            .await
            .map_err(|e| AppError::internal("Error updating user", e))?;

        if owner.is_some_and(|owner| owner.id != id) {
            warn!("Rejected email change for user {}: address in use", id);
            return Err(AppError::Conflict(EMAIL_TAKEN.into()));
        }
    }

    let password_hash = match input.password {
        Some(password) => Some(state.hasher.hash_off_thread(password).await?),
        None => None,
    };

    let changes = UserChanges {
        email: input.email,
        name: input.name,
        password_hash,
    };

    let user = state.store.update_user(id, changes).await.map_err(|e| match e {
        StoreError::NotFound => AppError::NotFound(USER_NOT_FOUND.into()),
        StoreError::UniqueViolation(_) => AppError::Conflict(EMAIL_TAKEN.into()),
        e => AppError::internal("Error updating user", e),
    })?;

    info!("Updated user {}", user.id);
    Ok(HttpResponse::Ok().json(user))
}

/// Deletes a user and, through the store's cascade, every task they own.
///
/// ## Responses:
/// - `204 No Content`: On successful deletion.
/// - `400 Bad Request`: If `id` is not a UUID.
/// - `404 Not Found`: If no user has that id.
/// - `500 Internal Server Error`: For database errors.
#[delete("/{id}")]
pub async fn delete_user(
    state: web::Data<AppState>,
    user_id: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let id = parse_user_id(&user_id)?;

    state.store.delete_user(id).await.map_err(|e| match e {
        StoreError::NotFound => AppError::NotFound(USER_NOT_FOUND.into()),
        e => AppError::internal("Error deleting user", e),
    })?;

    info!("Deleted user {}", id);
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_user_id() {
        let id = Uuid::new_v4();
        assert_eq!(parse_user_id(&id.to_string()).unwrap(), id);

        match parse_user_id("not-a-uuid") {
            Err(AppError::BadRequest(msg)) => assert_eq!(msg, "Invalid ID format"),
            other => panic!("Expected BadRequest, got {:?}", other),
        }
    }
}
