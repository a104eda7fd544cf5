// handlers/protected/reports.rs - GET /api/facings/with-competitors

use axum::extract::State;

use crate::middleware::{ApiQuery, ApiResponse, ApiResult, AuthUser};
use crate::services::aggregation::{facings_with_competitors, ReportFilter, ReportPage, ReportQuery, ReportRow};
use crate::state::AppState;

/**
 * GET /api/facings/with-competitors - Own facings per visit with competitor breakdown
 *
 * Query: user_id, store_id, category (each repeatable), business_unit,
 * start_date, end_date (YYYY-MM-DD, inclusive), limit, offset. A business
 * unit narrows the report to the categories its products belong to.
 *
 * Each row covers one (user, store, category, day) group:
 * ```json
 * { "user": "ana", "store_name": "Konzum 12", "category": "soup", "business_unit": "Culinary",
 *   "total_facings": 10, "competitors": { "BrandA": 3, "BrandB": 2 },
 *   "total_competitor_facings": 5 }
 * ```
 */
pub async fn with_competitors_get(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiQuery(pairs): ApiQuery<Vec<(String, String)>>,
) -> ApiResult<ReportPage<ReportRow>> {
    let query = ReportQuery::from_pairs(pairs)?;
    let filter = ReportFilter::scoped(query, &auth.identity(), &state.config.api)?;
    let page = facings_with_competitors(&state.db, &filter).await?;
    Ok(ApiResponse::success(page))
}
