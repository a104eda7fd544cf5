// handlers/protected/stores.rs - Store lookups for field users

use axum::extract::State;
use serde::Deserialize;

use crate::database::models::{RankedProduct, Store, StoreWithAssignee};
use crate::database::stores::StoreRepository;
use crate::error::ApiError;
use crate::middleware::{ApiPath, ApiQuery, ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct StoreQuery {
    pub channel: Option<String>,
}

/// GET /api/stores?channel=
pub async fn stores_list(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<StoreQuery>,
) -> ApiResult<Vec<StoreWithAssignee>> {
    let channel = query.channel.as_deref().map(str::trim).filter(|c| !c.is_empty());
    let stores = StoreRepository::new(&state.db).select_all(channel).await?;
    Ok(ApiResponse::success(stores))
}

/// GET /api/stores/assigned - stores assigned to the caller
pub async fn stores_assigned(State(state): State<AppState>, auth: AuthUser) -> ApiResult<Vec<Store>> {
    let stores = StoreRepository::new(&state.db).select_by_user(auth.user_id).await?;
    Ok(ApiResponse::success(stores))
}

/// GET /api/stores/:store_id
pub async fn store_get(
    State(state): State<AppState>,
    ApiPath(store_id): ApiPath<i32>,
) -> ApiResult<StoreWithAssignee> {
    let store = StoreRepository::new(&state.db).select_404(store_id).await?;
    Ok(ApiResponse::success(store))
}

/// GET /api/stores/user/:user_id - employees may only ask about themselves
pub async fn stores_by_user(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(user_id): ApiPath<i32>,
) -> ApiResult<Vec<Store>> {
    if !auth.is_admin() && auth.user_id != user_id {
        return Err(ApiError::forbidden("You can only view your own stores"));
    }
    let stores = StoreRepository::new(&state.db).select_by_user(user_id).await?;
    Ok(ApiResponse::success(stores))
}

/**
 * GET /api/stores/:store_id/products - Products a store reports on
 *
 * A store of category K sees products of category K and every later
 * category, each with its latest ranking.
 */
pub async fn store_products(
    State(state): State<AppState>,
    ApiPath(store_id): ApiPath<i32>,
) -> ApiResult<Vec<RankedProduct>> {
    let repo = StoreRepository::new(&state.db);
    let store = repo.select_404(store_id).await?;
    let category = store.store.category().map_err(|e| {
        tracing::error!(store_id, "Store has an invalid category: {}", e);
        ApiError::internal_server_error("Store category is invalid")
    })?;

    let products = repo.visible_products(category).await?;
    Ok(ApiResponse::success(products))
}
