// handlers/elevated/users.rs - Admin user management

use axum::extract::State;

use crate::auth::{hash_password, PasswordError, MIN_PASSWORD_LENGTH};
use crate::database::models::{NewUser, User, UserUpdate};
use crate::database::users::UserRepository;
use crate::error::ApiError;
use crate::middleware::{ApiJson, ApiPath, ApiResponse, ApiResult, AuthUser, Message};
use crate::state::AppState;

fn hash_new_password(password: &str) -> Result<String, ApiError> {
    hash_password(password).map_err(|e| match e {
        PasswordError::TooShort => ApiError::field_error(
            "password",
            format!("Password must be at least {} characters", MIN_PASSWORD_LENGTH),
        ),
        PasswordError::Hash(msg) => {
            tracing::error!("Password hashing failed: {}", msg);
            ApiError::internal_server_error("Could not store password")
        }
    })
}

/**
 * POST /api/users - Create an account
 *
 * Expected Input:
 * ```json
 * { "username": "ivo", "password": "at-least-8", "role": "employee" }
 * ```
 *
 * Duplicate usernames are rejected with 409.
 */
pub async fn user_post(State(state): State<AppState>, ApiJson(body): ApiJson<NewUser>) -> ApiResult<User> {
    let username = body.username.trim();
    if username.is_empty() {
        return Err(ApiError::field_error("username", "'username' is required"));
    }
    let hash = hash_new_password(&body.password)?;

    let user = UserRepository::new(&state.db).insert(username, &hash, body.role).await?;
    tracing::info!(user_id = user.user_id, role = %body.role, "User created");
    Ok(ApiResponse::created(user))
}

/// GET /api/users/:user_id
pub async fn user_get(State(state): State<AppState>, ApiPath(user_id): ApiPath<i32>) -> ApiResult<User> {
    let user = UserRepository::new(&state.db).select_404(user_id).await?;
    Ok(ApiResponse::success(user))
}

/// PUT /api/users/:user_id
pub async fn user_put(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<i32>,
    ApiJson(body): ApiJson<UserUpdate>,
) -> ApiResult<User> {
    let username = body.username.as_deref().map(str::trim);
    if username == Some("") {
        return Err(ApiError::field_error("username", "'username' cannot be empty"));
    }
    let hash = body.password.as_deref().map(hash_new_password).transpose()?;

    let user = UserRepository::new(&state.db)
        .update(user_id, username, body.role, hash.as_deref())
        .await?
        .ok_or_else(|| ApiError::not_found(format!("User {} not found", user_id)))?;
    Ok(ApiResponse::success(user))
}

/// DELETE /api/users/:user_id - admins cannot delete themselves
pub async fn user_delete(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(user_id): ApiPath<i32>,
) -> ApiResult<Message> {
    if user_id == auth.user_id {
        return Err(ApiError::bad_request("You cannot delete your own account"));
    }

    if !UserRepository::new(&state.db).delete(user_id).await? {
        return Err(ApiError::not_found(format!("User {} not found", user_id)));
    }
    tracing::info!(user_id, deleted_by = auth.user_id, "User deleted");
    Ok(ApiResponse::success(Message::new("User deleted")))
}
