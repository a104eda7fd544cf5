// handlers/protected/products.rs - Catalog reads

use axum::extract::State;
use serde::Deserialize;

use crate::database::models::{CompetitorProduct, RankedProduct};
use crate::database::products::ProductRepository;
use crate::middleware::{ApiQuery, ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    pub category: Option<String>,
}

/// GET /api/products?category=
pub async fn products_list(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ProductQuery>,
) -> ApiResult<Vec<RankedProduct>> {
    let products = ProductRepository::new(&state.db)
        .select_all(query.category.as_deref())
        .await?;
    Ok(ApiResponse::success(products))
}

#[derive(Debug, Default, Deserialize)]
pub struct CompetitorProductQuery {
    pub category: Option<String>,
    pub competitor_id: Option<i32>,
}

/// GET /api/products/competitor?category=&competitor_id=
pub async fn competitor_products_list(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<CompetitorProductQuery>,
) -> ApiResult<Vec<CompetitorProduct>> {
    let products = ProductRepository::new(&state.db)
        .select_competitor_products(query.category.as_deref(), query.competitor_id)
        .await?;
    Ok(ApiResponse::success(products))
}
