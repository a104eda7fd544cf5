// handlers/protected/price_checks.rs - Price-check batches and listing

use axum::extract::State;
use uuid::Uuid;

use crate::database::models::PriceCheck;
use crate::database::price_checks::{PriceCheckFilter, PriceCheckRepository};
use crate::error::ApiError;
use crate::middleware::{ApiJson, ApiPath, ApiQuery, ApiResponse, ApiResult, AuthUser};
use crate::services::batch_validator::PriceCheckInput;
use crate::services::batch_writer::{self, BatchReceipt, BatchTable};
use crate::state::AppState;

/**
 * POST /api/price-checks/batch - Record shelf prices
 *
 * Expected Input:
 * ```json
 * [
 *   { "store_id": 3, "category": "soup", "product_type": "podravka",
 *     "podravka_product_id": 12, "regular_price": "2.49", "deal_price": "1.99" },
 *   { "store_id": 3, "category": "soup", "product_type": "competitor",
 *     "brand_name": "Knorr", "regular_price": "2.79" }
 * ]
 * ```
 *
 * Each row references exactly one product: an own product for
 * `podravka`, a competitor brand (by id or name) for `competitor`.
 */
pub async fn batch_post(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(rows): ApiJson<Vec<PriceCheckInput>>,
) -> ApiResult<BatchReceipt> {
    let receipt =
        batch_writer::create_price_checks(&state.db, &auth.identity(), &rows, state.config.api.max_batch_rows).await?;
    Ok(ApiResponse::created(receipt))
}

/// GET /api/price-checks - employees are limited to their own rows
pub async fn price_checks_list(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiQuery(mut filter): ApiQuery<PriceCheckFilter>,
) -> ApiResult<Vec<PriceCheck>> {
    if !auth.is_admin() {
        match filter.user_id {
            Some(user_id) if user_id != auth.user_id => {
                return Err(ApiError::forbidden("You can only view your own price checks"));
            }
            _ => filter.user_id = Some(auth.user_id),
        }
    }
    if let Some(limit) = filter.limit {
        filter.limit = Some(limit.min(state.config.api.max_report_limit));
    }

    let rows = PriceCheckRepository::new(&state.db).select_filtered(&filter).await?;
    Ok(ApiResponse::success(rows))
}

/// GET /api/price-checks/batch/:batch_id
pub async fn batch_get(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(batch_id): ApiPath<Uuid>,
) -> ApiResult<Vec<PriceCheck>> {
    let owner = (!auth.is_admin()).then_some(auth.user_id);
    let rows = PriceCheckRepository::new(&state.db).select_batch(batch_id, owner).await?;
    if rows.is_empty() {
        return Err(ApiError::not_found(format!("Batch {} not found", batch_id)));
    }
    Ok(ApiResponse::success(rows))
}

/// DELETE /api/price-checks/batch/:batch_id
pub async fn batch_delete(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(batch_id): ApiPath<Uuid>,
) -> ApiResult<BatchReceipt> {
    let receipt = batch_writer::delete_batch(&state.db, BatchTable::PriceChecks, &auth.identity(), batch_id).await?;
    Ok(ApiResponse::success(receipt))
}
