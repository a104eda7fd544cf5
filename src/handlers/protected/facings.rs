// handlers/protected/facings.rs - Own-brand facing batches
//
// POST   /api/facings/podravka/batch            create a batch
// PUT    /api/facings/podravka/batch            overwrite rows of an existing batch
// GET    /api/facings/podravka/batch/:batch_id  rows of one batch
// DELETE /api/facings/podravka/batch/:batch_id  remove a batch
// GET    /api/facings/podravka/batches          caller's batch history
// GET    /api/facings/podravka/report           flat own-brand report

use axum::extract::State;
use serde::Deserialize;
use uuid::Uuid;

use crate::database::facings::FacingRepository;
use crate::database::models::{BatchSummary, OwnFacing, OwnFacingReportRow};
use crate::error::ApiError;
use crate::middleware::{ApiJson, ApiPath, ApiQuery, ApiResponse, ApiResult, AuthUser};
use crate::services::aggregation::{own_facings_report, ReportFilter, ReportPage, ReportQuery};
use crate::services::batch_validator::{BatchUpdate, OwnFacingChangeInput, OwnFacingInput};
use crate::services::batch_writer::{self, BatchReceipt, BatchTable};
use crate::state::AppState;

/**
 * POST /api/facings/podravka/batch - Record one shelf-counting session
 *
 * Expected Input:
 * ```json
 * [
 *   { "store_id": 3, "product_id": 12, "category": "soup", "facings_count": 4 },
 *   { "store_id": 3, "product_id": 15, "category": "soup", "facings_count": 2 }
 * ]
 * ```
 *
 * The whole array is accepted or rejected as one unit.
 */
pub async fn batch_post(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(rows): ApiJson<Vec<OwnFacingInput>>,
) -> ApiResult<BatchReceipt> {
    let receipt =
        batch_writer::create_own_facings(&state.db, &auth.identity(), &rows, state.config.api.max_batch_rows).await?;
    Ok(ApiResponse::created(receipt))
}

/// PUT /api/facings/podravka/batch - `{ "batchId": .., "facings": [..] }`
pub async fn batch_put(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(update): ApiJson<BatchUpdate<OwnFacingChangeInput>>,
) -> ApiResult<BatchReceipt> {
    let receipt =
        batch_writer::update_own_facings(&state.db, &auth.identity(), &update, state.config.api.max_batch_rows).await?;
    Ok(ApiResponse::success(receipt))
}

/// GET /api/facings/podravka/batch/:batch_id
pub async fn batch_get(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(batch_id): ApiPath<Uuid>,
) -> ApiResult<Vec<OwnFacing>> {
    let owner = (!auth.is_admin()).then_some(auth.user_id);
    let rows = FacingRepository::new(&state.db).own_batch(batch_id, owner).await?;
    if rows.is_empty() {
        return Err(ApiError::not_found(format!("Batch {} not found", batch_id)));
    }
    Ok(ApiResponse::success(rows))
}

/// DELETE /api/facings/podravka/batch/:batch_id
pub async fn batch_delete(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(batch_id): ApiPath<Uuid>,
) -> ApiResult<BatchReceipt> {
    let receipt = batch_writer::delete_batch(&state.db, BatchTable::OwnFacings, &auth.identity(), batch_id).await?;
    Ok(ApiResponse::success(receipt))
}

#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    pub user_id: Option<i32>,
}

/// Admins may look at anyone's history; everyone else gets their own
pub(crate) fn history_owner(auth: &AuthUser, query: &HistoryQuery) -> Result<i32, ApiError> {
    match query.user_id {
        Some(user_id) if user_id != auth.user_id && !auth.is_admin() => {
            Err(ApiError::forbidden("You can only view your own batches"))
        }
        Some(user_id) => Ok(user_id),
        None => Ok(auth.user_id),
    }
}

/// GET /api/facings/podravka/batches
pub async fn batches_list(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiQuery(query): ApiQuery<HistoryQuery>,
) -> ApiResult<Vec<BatchSummary>> {
    let user_id = history_owner(&auth, &query)?;
    let batches = FacingRepository::new(&state.db).own_batches_for_user(user_id).await?;
    Ok(ApiResponse::success(batches))
}

/// GET /api/facings/podravka/report
pub async fn report_get(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiQuery(pairs): ApiQuery<Vec<(String, String)>>,
) -> ApiResult<ReportPage<OwnFacingReportRow>> {
    let query = ReportQuery::from_pairs(pairs)?;
    let filter = ReportFilter::scoped(query, &auth.identity(), &state.config.api)?;
    let page = own_facings_report(&state.db, &filter).await?;
    Ok(ApiResponse::success(page))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Role;

    fn user(user_id: i32, role: Role) -> AuthUser {
        AuthUser { user_id, user: format!("user{}", user_id), role }
    }

    #[test]
    fn history_defaults_to_caller() {
        let query = HistoryQuery::default();
        assert_eq!(history_owner(&user(4, Role::Employee), &query).unwrap(), 4);
    }

    #[test]
    fn only_admins_read_other_histories() {
        let query = HistoryQuery { user_id: Some(9) };
        assert!(history_owner(&user(4, Role::Employee), &query).is_err());
        assert_eq!(history_owner(&user(1, Role::Admin), &query).unwrap(), 9);
    }
}
