// handlers/public/auth/login.rs - POST /api/users/login handler

use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::auth::{generate_jwt, verify_password, Claims};
use crate::database::users::UserRepository;
use crate::error::ApiError;
use crate::middleware::{ApiJson, ApiResponse, ApiResult};
use crate::state::AppState;
use crate::types::Role;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(alias = "user")]
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginUser {
    pub id: i32,
    pub user: String,
    pub role: Role,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_in: u64,
    pub user: LoginUser,
}

/**
 * POST /api/users/login - Exchange credentials for a bearer token
 *
 * Expected Input:
 * ```json
 * { "username": "ana", "password": "secret123" }
 * ```
 *
 * Unknown users and wrong passwords get the same 401 so the response does
 * not reveal which usernames exist.
 */
pub async fn login_post(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let username = body.username.trim();
    if username.is_empty() || body.password.is_empty() {
        return Err(ApiError::bad_request("Username and password are required"));
    }

    let user = UserRepository::new(&state.db).find_by_username(username).await?;
    let user = match user {
        Some(user) if verify_password(&body.password, &user.password_hash) => user,
        _ => {
            tracing::warn!(username, "Failed login attempt");
            return Err(ApiError::unauthorized("Invalid credentials"));
        }
    };

    let security = &state.config.security;
    let claims = Claims::new(user.user_id, user.username.clone(), user.role(), security.jwt_expiry_hours);
    let token = generate_jwt(&claims, security).map_err(|e| {
        tracing::error!("Failed to sign token: {}", e);
        ApiError::internal_server_error("Could not issue token")
    })?;

    tracing::info!(user_id = user.user_id, "User logged in");
    Ok(ApiResponse::success(LoginResponse {
        token,
        expires_in: security.jwt_expiry_hours * 3600,
        user: LoginUser {
            id: user.user_id,
            user: user.username.clone(),
            role: user.role(),
        },
    }))
}
