// handlers/elevated/stores.rs - Admin store management

use axum::extract::State;

use crate::database::models::{NewStore, Store, StoreUpdate};
use crate::database::stores::StoreRepository;
use crate::error::ApiError;
use crate::middleware::{ApiJson, ApiPath, ApiResponse, ApiResult, Message};
use crate::state::AppState;

/// POST /api/stores
pub async fn store_post(State(state): State<AppState>, ApiJson(body): ApiJson<NewStore>) -> ApiResult<Store> {
    if body.store_name.trim().is_empty() {
        return Err(ApiError::field_error("store_name", "'store_name' is required"));
    }
    let store = StoreRepository::new(&state.db).insert(&body).await?;
    tracing::info!(store_id = store.store_id, "Store created");
    Ok(ApiResponse::created(store))
}

/// PUT /api/stores/:store_id - `"user_id": null` unassigns the store
pub async fn store_put(
    State(state): State<AppState>,
    ApiPath(store_id): ApiPath<i32>,
    ApiJson(body): ApiJson<StoreUpdate>,
) -> ApiResult<Store> {
    let store = StoreRepository::new(&state.db)
        .update(store_id, &body)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Store {} not found", store_id)))?;
    Ok(ApiResponse::success(store))
}

/// DELETE /api/stores/:store_id - refused with 409 while submissions reference it
pub async fn store_delete(State(state): State<AppState>, ApiPath(store_id): ApiPath<i32>) -> ApiResult<Message> {
    if !StoreRepository::new(&state.db).delete(store_id).await? {
        return Err(ApiError::not_found(format!("Store {} not found", store_id)));
    }
    tracing::info!(store_id, "Store deleted");
    Ok(ApiResponse::success(Message::new("Store deleted")))
}
