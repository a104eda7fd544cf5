// handlers/elevated/photos.rs - Admin photo listing and bulk removal

use axum::extract::State;
use futures::future::join_all;
use serde::{Deserialize, Serialize};

use crate::database::models::ReportPhoto;
use crate::database::photos::PhotoRepository;
use crate::middleware::{ApiJson, ApiResponse, ApiResult};
use crate::services::photo_storage::{public_id_from_url, DestroyOutcome};
use crate::state::AppState;

/// GET /api/photos
pub async fn photos_list(State(state): State<AppState>) -> ApiResult<Vec<ReportPhoto>> {
    let photos = PhotoRepository::new(&state.db).select_all().await?;
    Ok(ApiResponse::success(photos))
}

#[derive(Debug, Deserialize)]
pub struct BulkDelete {
    #[serde(alias = "photoUrls")]
    pub photo_urls: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeleteStatus {
    Success,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct UrlDeletion {
    pub url: String,
    pub status: DeleteStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub db_affected: Option<u64>,
}

impl UrlDeletion {
    fn failed(url: String, reason: impl Into<String>) -> Self {
        Self {
            url,
            status: DeleteStatus::Failed,
            reason: Some(reason.into()),
            db_affected: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BulkDeleteResult {
    pub results: Vec<UrlDeletion>,
}

async fn delete_one(state: &AppState, url: String) -> UrlDeletion {
    let Some(public_id) = public_id_from_url(&url) else {
        return UrlDeletion::failed(url, "Invalid URL");
    };

    match state.photos.destroy(&public_id).await {
        Ok(DestroyOutcome::Deleted) => {}
        Ok(DestroyOutcome::Failed(reason)) => return UrlDeletion::failed(url, reason),
        Err(e) => return UrlDeletion::failed(url, e.to_string()),
    }

    match PhotoRepository::new(&state.db).delete_by_url(&url).await {
        Ok(affected) => UrlDeletion {
            url,
            status: DeleteStatus::Success,
            reason: None,
            db_affected: Some(affected),
        },
        Err(e) => {
            tracing::error!(public_id = %public_id, "Photo removed from storage but row delete failed: {}", e);
            UrlDeletion::failed(url, "Database error")
        }
    }
}

/**
 * POST /api/photos/bulk-delete - Remove photos by delivery URL
 *
 * Expected Input:
 * ```json
 * { "photoUrls": ["https://res.cloudinary.com/x/image/upload/v1/podravka/a.jpg"] }
 * ```
 *
 * Every URL is handled independently; the response reports each outcome.
 */
pub async fn photos_bulk_delete(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<BulkDelete>,
) -> ApiResult<BulkDeleteResult> {
    let results = join_all(body.photo_urls.into_iter().map(|url| delete_one(&state, url))).await;

    let removed = results.iter().filter(|r| r.status == DeleteStatus::Success).count();
    tracing::info!(requested = results.len(), removed, "Bulk photo delete finished");
    Ok(ApiResponse::success(BulkDeleteResult { results }))
}
