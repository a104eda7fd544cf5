// handlers/protected/competitors.rs - Competitor brand lookups

use axum::extract::State;

use crate::database::competitors::CompetitorRepository;
use crate::database::models::CompetitorBrand;
use crate::error::ApiError;
use crate::middleware::{ApiPath, ApiResponse, ApiResult};
use crate::services::brand_resolver::canonical_brand_name;
use crate::state::AppState;

/// GET /api/competitors
pub async fn competitors_list(State(state): State<AppState>) -> ApiResult<Vec<CompetitorBrand>> {
    let brands = CompetitorRepository::new(&state.db).select_all().await?;
    Ok(ApiResponse::success(brands))
}

/// GET /api/competitors/id/:competitor_id
pub async fn competitor_get(
    State(state): State<AppState>,
    ApiPath(competitor_id): ApiPath<i32>,
) -> ApiResult<CompetitorBrand> {
    let brand = CompetitorRepository::new(&state.db).select_404(competitor_id).await?;
    Ok(ApiResponse::success(brand))
}

/// GET /api/competitors/name/:brand_name - case-insensitive match
pub async fn competitor_by_name(
    State(state): State<AppState>,
    ApiPath(brand_name): ApiPath<String>,
) -> ApiResult<CompetitorBrand> {
    let name = canonical_brand_name(&brand_name).ok_or_else(|| ApiError::bad_request("Brand name is required"))?;
    let brand = CompetitorRepository::new(&state.db)
        .find_by_name(name)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Competitor '{}' not found", name)))?;
    Ok(ApiResponse::success(brand))
}

/// GET /api/competitors/category/:category
pub async fn competitors_by_category(
    State(state): State<AppState>,
    ApiPath(category): ApiPath<String>,
) -> ApiResult<Vec<CompetitorBrand>> {
    let brands = CompetitorRepository::new(&state.db)
        .select_by_category(category.trim())
        .await?;
    Ok(ApiResponse::success(brands))
}
