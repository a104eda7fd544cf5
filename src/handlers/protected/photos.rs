// handlers/protected/photos.rs - Report photo upload and per-user access
//
// POST   /api/photos            multipart upload
// GET    /api/photos/mine       caller's photos
// GET    /api/photos/:photo_id  one photo (owner or admin)
// DELETE /api/photos/:photo_id  remove from storage and database (owner or admin)

use axum::extract::{Multipart, State};

use crate::database::models::{NewPhoto, ReportPhoto};
use crate::database::photos::PhotoRepository;
use crate::database::stores::StoreRepository;
use crate::error::ApiError;
use crate::middleware::{ApiMultipart, ApiPath, ApiResponse, ApiResult, AuthUser, Message};
use crate::services::photo_storage::{allowed_extension, DestroyOutcome, PhotoUpload, StorageError};
use crate::state::AppState;

const DEFAULT_PHOTO_STAGE: &str = "before";

/// Text fields and the file collected from an upload form
#[derive(Debug, Default)]
struct UploadForm {
    photo: Option<PhotoUpload>,
    photo_type: Option<String>,
    category: Option<String>,
    store_id: Option<String>,
    photo_description: Option<String>,
    photo_stage: Option<String>,
    custom_name: Option<String>,
}

impl UploadForm {
    async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = UploadForm::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "photo" => {
                    let file_name = field.file_name().unwrap_or_default().to_string();
                    let content_type = field.content_type().map(str::to_string);
                    let bytes = field.bytes().await?;
                    form.photo = Some(PhotoUpload {
                        file_name,
                        content_type,
                        bytes: bytes.to_vec(),
                        custom_name: None,
                    });
                }
                "photo_type" => form.photo_type = non_blank(field.text().await?),
                "category" => form.category = non_blank(field.text().await?),
                "store_id" => form.store_id = non_blank(field.text().await?),
                "photo_description" => form.photo_description = non_blank(field.text().await?),
                "photo_stage" => form.photo_stage = non_blank(field.text().await?),
                "customName" | "custom_name" => form.custom_name = non_blank(field.text().await?),
                _ => {}
            }
        }

        Ok(form)
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn required(value: Option<String>, field: &str) -> Result<String, ApiError> {
    value.ok_or_else(|| ApiError::field_error(field, format!("'{}' is required", field)))
}

/**
 * POST /api/photos - Upload a shelf photo
 *
 * Multipart fields: `photo` (file, jpg/jpeg/png/webp), `photo_type`,
 * `category`, `store_id`, optional `photo_description`, `photo_stage`
 * (defaults to "before") and `customName` (storage name override).
 */
pub async fn photo_post(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiMultipart(multipart): ApiMultipart,
) -> ApiResult<ReportPhoto> {
    if !state.photos.is_enabled() {
        return Err(StorageError::NotConfigured.into());
    }

    let form = UploadForm::read(multipart).await?;
    let mut upload = form
        .photo
        .ok_or_else(|| ApiError::field_error("photo", "'photo' is required"))?;
    if upload.bytes.is_empty() {
        return Err(ApiError::field_error("photo", "Uploaded photo is empty"));
    }
    allowed_extension(&upload.file_name)?;
    upload.custom_name = form.custom_name;

    let photo_type = required(form.photo_type, "photo_type")?;
    let category = required(form.category, "category")?;
    let store_id: i32 = required(form.store_id, "store_id")?
        .parse()
        .map_err(|_| ApiError::field_error("store_id", "'store_id' must be an integer"))?;

    let store = StoreRepository::new(&state.db).select_404(store_id).await?;
    if !auth.is_admin() && store.store.user_id != Some(auth.user_id) {
        return Err(ApiError::forbidden(format!("Store {} is not assigned to you", store_id)));
    }

    let stored = state.photos.upload(upload).await?;

    let new_photo = NewPhoto {
        photo_type,
        photo_url: stored.url,
        public_id: stored.public_id,
        photo_description: form.photo_description,
        photo_stage: form.photo_stage.unwrap_or_else(|| DEFAULT_PHOTO_STAGE.to_string()),
        category,
        user_id: auth.user_id,
        store_id,
    };

    match PhotoRepository::new(&state.db).insert(&new_photo).await {
        Ok(photo) => {
            tracing::info!(photo_id = photo.photo_id, user_id = auth.user_id, store_id, "Photo uploaded");
            Ok(ApiResponse::created(photo))
        }
        Err(e) => {
            // Don't leave an unreferenced image behind
            if let Err(cleanup) = state.photos.destroy(&new_photo.public_id).await {
                tracing::warn!(public_id = %new_photo.public_id, "Could not remove orphaned upload: {}", cleanup);
            }
            Err(e.into())
        }
    }
}

/// GET /api/photos/mine
pub async fn photos_mine(State(state): State<AppState>, auth: AuthUser) -> ApiResult<Vec<ReportPhoto>> {
    let photos = PhotoRepository::new(&state.db).select_by_user(auth.user_id).await?;
    Ok(ApiResponse::success(photos))
}

async fn owned_photo(state: &AppState, auth: &AuthUser, photo_id: i32) -> Result<ReportPhoto, ApiError> {
    let photo = PhotoRepository::new(&state.db).select_404(photo_id).await?;
    if !auth.is_admin() && photo.user_id != auth.user_id {
        return Err(ApiError::forbidden("You can only access your own photos"));
    }
    Ok(photo)
}

/// GET /api/photos/:photo_id
pub async fn photo_get(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(photo_id): ApiPath<i32>,
) -> ApiResult<ReportPhoto> {
    let photo = owned_photo(&state, &auth, photo_id).await?;
    Ok(ApiResponse::success(photo))
}

/// DELETE /api/photos/:photo_id - a storage copy that is already gone still frees the row
pub async fn photo_delete(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(photo_id): ApiPath<i32>,
) -> ApiResult<Message> {
    let photo = owned_photo(&state, &auth, photo_id).await?;

    match state.photos.destroy(&photo.public_id).await? {
        DestroyOutcome::Deleted => {}
        DestroyOutcome::Failed(reason) if reason == "not found" => {
            tracing::warn!(photo_id, public_id = %photo.public_id, "Photo already missing from storage");
        }
        DestroyOutcome::Failed(reason) => {
            return Err(ApiError::bad_gateway(format!("Photo storage refused delete: {}", reason)));
        }
    }

    PhotoRepository::new(&state.db).delete(photo_id).await?;
    tracing::info!(photo_id, user_id = auth.user_id, "Photo deleted");
    Ok(ApiResponse::success(Message::new("Photo deleted")))
}
