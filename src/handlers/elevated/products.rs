// handlers/elevated/products.rs - Catalog maintenance

use axum::extract::State;

use crate::database::models::{
    CompetitorProduct, CompetitorProductUpdate, NewCompetitorProduct, NewProduct, Product, ProductRanking, RankingInput,
};
use crate::database::products::ProductRepository;
use crate::error::ApiError;
use crate::middleware::{ApiJson, ApiPath, ApiResponse, ApiResult, AuthUser, Message};
use crate::state::AppState;

/// POST /api/products
pub async fn product_post(State(state): State<AppState>, ApiJson(body): ApiJson<NewProduct>) -> ApiResult<Product> {
    if body.name.trim().is_empty() {
        return Err(ApiError::field_error("name", "'name' is required"));
    }
    let product = ProductRepository::new(&state.db).insert(&body).await?;
    Ok(ApiResponse::created(product))
}

/// PUT /api/products/:product_id/rankings/:year - insert or replace
pub async fn ranking_put(
    State(state): State<AppState>,
    ApiPath((product_id, year)): ApiPath<(i32, i32)>,
    ApiJson(body): ApiJson<RankingInput>,
) -> ApiResult<ProductRanking> {
    if body.category_rank < 1 {
        return Err(ApiError::field_error("category_rank", "'category_rank' must be positive"));
    }
    let ranking = ProductRepository::new(&state.db)
        .upsert_ranking(product_id, year, &body)
        .await?;
    Ok(ApiResponse::success(ranking))
}

/// POST /api/products/competitor
pub async fn competitor_product_post(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(body): ApiJson<NewCompetitorProduct>,
) -> ApiResult<CompetitorProduct> {
    if body.name.trim().is_empty() {
        return Err(ApiError::field_error("name", "'name' is required"));
    }
    if body.category.trim().is_empty() {
        return Err(ApiError::field_error("category", "'category' is required"));
    }
    let product = ProductRepository::new(&state.db)
        .insert_competitor_product(&body, auth.user_id)
        .await?;
    Ok(ApiResponse::created(product))
}

/// PUT /api/products/competitor/:product_id
pub async fn competitor_product_put(
    State(state): State<AppState>,
    ApiPath(product_id): ApiPath<i32>,
    ApiJson(body): ApiJson<CompetitorProductUpdate>,
) -> ApiResult<CompetitorProduct> {
    let product = ProductRepository::new(&state.db)
        .update_competitor_product(product_id, &body)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Competitor product {} not found", product_id)))?;
    Ok(ApiResponse::success(product))
}

/// DELETE /api/products/competitor/:product_id
pub async fn competitor_product_delete(
    State(state): State<AppState>,
    ApiPath(product_id): ApiPath<i32>,
) -> ApiResult<Message> {
    if !ProductRepository::new(&state.db).delete_competitor_product(product_id).await? {
        return Err(ApiError::not_found(format!("Competitor product {} not found", product_id)));
    }
    Ok(ApiResponse::success(Message::new("Competitor product deleted")))
}
