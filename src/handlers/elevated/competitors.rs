// handlers/elevated/competitors.rs - Competitor brand maintenance

use axum::extract::State;

use crate::database::competitors::CompetitorRepository;
use crate::database::models::{CompetitorBrand, CompetitorInput, CompetitorUpdate};
use crate::error::ApiError;
use crate::middleware::{ApiJson, ApiPath, ApiResponse, ApiResult, Message};
use crate::services::brand_resolver::canonical_brand_name;
use crate::state::AppState;

/// POST /api/competitors - `{ "brand_name": "Knorr", "categories": ["soup"] }`
pub async fn competitor_post(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CompetitorInput>,
) -> ApiResult<CompetitorBrand> {
    if canonical_brand_name(&body.brand_name).is_none() {
        return Err(ApiError::field_error("brand_name", "'brand_name' is required"));
    }
    let brand = CompetitorRepository::new(&state.db).insert(&body).await?;
    tracing::info!(competitor_id = brand.competitor_id, "Competitor brand created");
    Ok(ApiResponse::created(brand))
}

/// PUT /api/competitors/:competitor_id - `categories`, when sent, replaces the mapping
pub async fn competitor_put(
    State(state): State<AppState>,
    ApiPath(competitor_id): ApiPath<i32>,
    ApiJson(body): ApiJson<CompetitorUpdate>,
) -> ApiResult<CompetitorBrand> {
    if let Some(name) = &body.brand_name {
        if canonical_brand_name(name).is_none() {
            return Err(ApiError::field_error("brand_name", "'brand_name' cannot be empty"));
        }
    }
    let brand = CompetitorRepository::new(&state.db)
        .update(competitor_id, &body)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Competitor {} not found", competitor_id)))?;
    Ok(ApiResponse::success(brand))
}

/// DELETE /api/competitors/:competitor_id - blocked while anything references the brand
pub async fn competitor_delete(
    State(state): State<AppState>,
    ApiPath(competitor_id): ApiPath<i32>,
) -> ApiResult<Message> {
    let repo = CompetitorRepository::new(&state.db);
    repo.select_404(competitor_id).await?;

    let usage = repo.usage(competitor_id).await?;
    if usage.is_referenced() {
        return Err(ApiError::conflict(format!(
            "Competitor {} is still referenced by {} facings, {} price checks and {} products",
            competitor_id, usage.facings, usage.price_checks, usage.products
        )));
    }

    repo.delete(competitor_id).await?;
    tracing::info!(competitor_id, "Competitor brand deleted");
    Ok(ApiResponse::success(Message::new("Competitor deleted")))
}
