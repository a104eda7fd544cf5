// handlers/protected/competitor_facings.rs - Competitor facing batches

use axum::extract::State;
use uuid::Uuid;

use super::facings::{history_owner, HistoryQuery};
use crate::database::facings::FacingRepository;
use crate::database::models::{BatchSummary, CompetitorFacing};
use crate::error::ApiError;
use crate::middleware::{ApiJson, ApiPath, ApiQuery, ApiResponse, ApiResult, AuthUser};
use crate::services::batch_validator::{BatchUpdate, CompetitorFacingChangeInput, CompetitorFacingInput};
use crate::services::batch_writer::{self, BatchReceipt, BatchTable};
use crate::state::AppState;

/**
 * POST /api/facings/competitor/batch - Record competitor shelf counts
 *
 * Expected Input:
 * ```json
 * [
 *   { "store_id": 3, "competitor_id": 7, "category": "soup", "facings_count": 5 },
 *   { "store_id": 3, "brand_name": "Knorr", "category": "soup", "facings_count": 3 }
 * ]
 * ```
 *
 * Rows naming a brand that does not exist yet register it.
 */
pub async fn batch_post(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(rows): ApiJson<Vec<CompetitorFacingInput>>,
) -> ApiResult<BatchReceipt> {
    let receipt =
        batch_writer::create_competitor_facings(&state.db, &auth.identity(), &rows, state.config.api.max_batch_rows)
            .await?;
    Ok(ApiResponse::created(receipt))
}

/// PUT /api/facings/competitor/batch
pub async fn batch_put(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(update): ApiJson<BatchUpdate<CompetitorFacingChangeInput>>,
) -> ApiResult<BatchReceipt> {
    let receipt =
        batch_writer::update_competitor_facings(&state.db, &auth.identity(), &update, state.config.api.max_batch_rows)
            .await?;
    Ok(ApiResponse::success(receipt))
}

/// GET /api/facings/competitor/batch/:batch_id
pub async fn batch_get(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(batch_id): ApiPath<Uuid>,
) -> ApiResult<Vec<CompetitorFacing>> {
    let owner = (!auth.is_admin()).then_some(auth.user_id);
    let rows = FacingRepository::new(&state.db).competitor_batch(batch_id, owner).await?;
    if rows.is_empty() {
        return Err(ApiError::not_found(format!("Batch {} not found", batch_id)));
    }
    Ok(ApiResponse::success(rows))
}

/// DELETE /api/facings/competitor/batch/:batch_id
pub async fn batch_delete(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(batch_id): ApiPath<Uuid>,
) -> ApiResult<BatchReceipt> {
    let receipt =
        batch_writer::delete_batch(&state.db, BatchTable::CompetitorFacings, &auth.identity(), batch_id).await?;
    Ok(ApiResponse::success(receipt))
}

/// GET /api/facings/competitor/batches
pub async fn batches_list(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiQuery(query): ApiQuery<HistoryQuery>,
) -> ApiResult<Vec<BatchSummary>> {
    let user_id = history_owner(&auth, &query)?;
    let batches = FacingRepository::new(&state.db).competitor_batches_for_user(user_id).await?;
    Ok(ApiResponse::success(batches))
}
