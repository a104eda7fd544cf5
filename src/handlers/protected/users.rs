// handlers/protected/users.rs - User listing and self-service password change

use axum::extract::State;
use serde::Deserialize;

use crate::auth::{hash_password, verify_password, MIN_PASSWORD_LENGTH};
use crate::database::models::User;
use crate::database::users::UserRepository;
use crate::error::ApiError;
use crate::middleware::{ApiJson, ApiResponse, ApiResult, AuthUser, Message};
use crate::state::AppState;

/// GET /api/users
pub async fn users_list(State(state): State<AppState>) -> ApiResult<Vec<User>> {
    let users = UserRepository::new(&state.db).select_all().await?;
    Ok(ApiResponse::success(users))
}

#[derive(Debug, Deserialize)]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
}

/**
 * PUT /api/users/me/password - Change the caller's own password
 *
 * Expected Input:
 * ```json
 * { "current_password": "old-secret", "new_password": "new-secret" }
 * ```
 */
pub async fn password_put(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(body): ApiJson<PasswordChange>,
) -> ApiResult<Message> {
    if body.new_password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ApiError::field_error(
            "new_password",
            format!("Password must be at least {} characters", MIN_PASSWORD_LENGTH),
        ));
    }

    let repo = UserRepository::new(&state.db);
    let user = repo.select_404(auth.user_id).await?;
    if !verify_password(&body.current_password, &user.password_hash) {
        return Err(ApiError::unauthorized("Current password is incorrect"));
    }

    let hash = hash_password(&body.new_password).map_err(|e| {
        tracing::error!("Password hashing failed: {}", e);
        ApiError::internal_server_error("Could not update password")
    })?;
    repo.update_password(auth.user_id, &hash).await?;

    tracing::info!(user_id = auth.user_id, "Password changed");
    Ok(ApiResponse::success(Message::new("Password updated")))
}
