// Object storage for report photos.
//
// Uploads go to Cloudinary's signed upload API. Signatures are the SHA-1 hex
// digest of the alphabetically sorted `key=value` parameters joined by `&`,
// immediately followed by the API secret.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use sha1::{Digest, Sha1};
use url::Url;

use crate::config::StorageConfig;

pub const ALLOWED_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "webp"];

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("photo storage is not configured")]
    NotConfigured,
    #[error("{0}")]
    InvalidUpload(String),
    #[error("upstream storage error: {0}")]
    Upstream(String),
}

impl From<reqwest::Error> for StorageError {
    fn from(err: reqwest::Error) -> Self {
        StorageError::Upstream(err.to_string())
    }
}

/// An image received from a client, ready to hand to storage
#[derive(Debug, Clone)]
pub struct PhotoUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
    pub custom_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredPhoto {
    pub url: String,
    pub public_id: String,
}

/// Result of a destroy call; anything but `Deleted` carries the provider's reason
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DestroyOutcome {
    Deleted,
    Failed(String),
}

#[async_trait]
pub trait PhotoStorage: Send + Sync {
    /// Whether uploads can succeed at all; checked before any other work
    fn is_enabled(&self) -> bool {
        true
    }

    async fn upload(&self, upload: PhotoUpload) -> Result<StoredPhoto, StorageError>;
    async fn destroy(&self, public_id: &str) -> Result<DestroyOutcome, StorageError>;
}

/// Used when no storage credentials are configured
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledStorage;

#[async_trait]
impl PhotoStorage for DisabledStorage {
    fn is_enabled(&self) -> bool {
        false
    }

    async fn upload(&self, _upload: PhotoUpload) -> Result<StoredPhoto, StorageError> {
        Err(StorageError::NotConfigured)
    }

    async fn destroy(&self, _public_id: &str) -> Result<DestroyOutcome, StorageError> {
        Err(StorageError::NotConfigured)
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

pub struct CloudinaryStorage {
    client: reqwest::Client,
    cloud_name: String,
    api_key: String,
    api_secret: String,
    folder: String,
}

impl CloudinaryStorage {
    /// Build from config; `None` when any credential is missing
    pub fn from_config(config: &StorageConfig) -> Result<Option<Self>, StorageError> {
        let (Some(cloud_name), Some(api_key), Some(api_secret)) =
            (&config.cloud_name, &config.api_key, &config.api_secret)
        else {
            return Ok(None);
        };

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Some(Self {
            client,
            cloud_name: cloud_name.clone(),
            api_key: api_key.clone(),
            api_secret: api_secret.clone(),
            folder: config.folder.clone(),
        }))
    }

    fn endpoint(&self, action: &str) -> String {
        format!("https://api.cloudinary.com/v1_1/{}/image/{}", self.cloud_name, action)
    }

    fn timestamp() -> String {
        chrono::Utc::now().timestamp().to_string()
    }

    async fn read_error(response: reqwest::Response) -> StorageError {
        let status = response.status();
        match response.json::<ErrorResponse>().await {
            Ok(body) => StorageError::Upstream(format!("{}: {}", status, body.error.message)),
            Err(_) => StorageError::Upstream(status.to_string()),
        }
    }
}

#[async_trait]
impl PhotoStorage for CloudinaryStorage {
    async fn upload(&self, upload: PhotoUpload) -> Result<StoredPhoto, StorageError> {
        let extension = allowed_extension(&upload.file_name)?;
        let public_id = public_id_for(upload.custom_name.as_deref(), &upload.file_name)?;
        let timestamp = Self::timestamp();

        let mut params = BTreeMap::new();
        params.insert("folder", self.folder.clone());
        params.insert("public_id", public_id.clone());
        params.insert("timestamp", timestamp);
        let signature = sign(&params, &self.api_secret);

        let mut file = reqwest::multipart::Part::bytes(upload.bytes).file_name(upload.file_name.clone());
        let mime = upload.content_type.unwrap_or_else(|| format!("image/{}", extension));
        file = file.mime_str(&mime).map_err(|_| StorageError::InvalidUpload(format!("Unsupported content type '{}'", mime)))?;

        let mut form = reqwest::multipart::Form::new()
            .part("file", file)
            .text("api_key", self.api_key.clone())
            .text("signature", signature);
        for (key, value) in params {
            form = form.text(key, value);
        }

        let response = self.client.post(self.endpoint("upload")).multipart(form).send().await?;
        if !response.status().is_success() {
            return Err(Self::read_error(response).await);
        }

        let body: UploadResponse = response.json().await?;
        tracing::info!(public_id = %body.public_id, "Uploaded photo");
        Ok(StoredPhoto {
            url: body.secure_url,
            public_id: body.public_id,
        })
    }

    async fn destroy(&self, public_id: &str) -> Result<DestroyOutcome, StorageError> {
        let mut params = BTreeMap::new();
        params.insert("invalidate", "true".to_string());
        params.insert("public_id", public_id.to_string());
        params.insert("timestamp", Self::timestamp());
        let signature = sign(&params, &self.api_secret);

        let mut form: Vec<(&str, String)> = params.into_iter().collect();
        form.push(("api_key", self.api_key.clone()));
        form.push(("signature", signature));

        let response = self.client.post(self.endpoint("destroy")).form(&form).send().await?;
        if !response.status().is_success() {
            return Err(Self::read_error(response).await);
        }

        let body: DestroyResponse = response.json().await?;
        if body.result == "ok" {
            tracing::info!(public_id, "Destroyed photo");
            Ok(DestroyOutcome::Deleted)
        } else {
            tracing::warn!(public_id, result = %body.result, "Photo destroy was not applied");
            Ok(DestroyOutcome::Failed(body.result))
        }
    }
}

/// SHA-1 request signature over sorted parameters
pub fn sign(params: &BTreeMap<&str, String>, api_secret: &str) -> String {
    let to_sign = params
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha1::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

/// Lowercased extension if it is an accepted image format
pub fn allowed_extension(file_name: &str) -> Result<String, StorageError> {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    if ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        Ok(extension)
    } else {
        Err(StorageError::InvalidUpload(format!(
            "Unsupported image format; expected one of {}",
            ALLOWED_EXTENSIONS.join(", ")
        )))
    }
}

/// Storage id from the client's custom name, else the file stem.
/// Whitespace runs become a single '-', and the result is lowercased.
pub fn public_id_for(custom_name: Option<&str>, file_name: &str) -> Result<String, StorageError> {
    let stem = file_name.split('.').next().unwrap_or_default();
    let base = custom_name.map(str::trim).filter(|name| !name.is_empty()).unwrap_or(stem);

    let public_id = base.split_whitespace().collect::<Vec<_>>().join("-").to_lowercase();
    if public_id.is_empty() {
        return Err(StorageError::InvalidUpload("Photo needs a file name".to_string()));
    }
    Ok(public_id)
}

/// Recover the storage id (folder included) from a delivery URL.
///
/// `https://res.cloudinary.com/demo/image/upload/v1716/podravka/shelf-1.jpg`
/// yields `podravka/shelf-1`.
pub fn public_id_from_url(photo_url: &str) -> Option<String> {
    let parsed = Url::parse(photo_url).ok()?;
    let path = parsed.path();
    let (_, after_upload) = path.split_once("/upload/")?;

    let mut segments: Vec<&str> = after_upload.split('/').filter(|s| !s.is_empty()).collect();
    if let Some(first) = segments.first() {
        let is_version = first.len() > 1 && first.starts_with('v') && first[1..].chars().all(|c| c.is_ascii_digit());
        if is_version {
            segments.remove(0);
        }
    }

    let last = segments.pop()?;
    let stem = last.split('.').next().unwrap_or(last);
    if stem.is_empty() {
        return None;
    }
    segments.push(stem);
    Some(segments.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_matches_documented_example() {
        // Example pair from Cloudinary's signing documentation
        let mut params = BTreeMap::new();
        params.insert("eager", "w_400,h_300,c_pad|w_260,h_200,c_crop".to_string());
        params.insert("public_id", "sample_image".to_string());
        params.insert("timestamp", "1315060510".to_string());
        assert_eq!(
            sign(&params, "abcd"),
            "bfd09f95f331f558cbd1320e67aa8d488770583e"
        );
    }

    #[test]
    fn public_id_prefers_custom_name() {
        assert_eq!(public_id_for(Some("Shelf  Soup Aisle"), "IMG_01.jpg").unwrap(), "shelf-soup-aisle");
        assert_eq!(public_id_for(None, "Krem Juhe.JPG").unwrap(), "krem-juhe");
        assert_eq!(public_id_for(Some("   "), "front.png").unwrap(), "front");
        assert!(public_id_for(None, ".jpg").is_err());
    }

    #[test]
    fn only_image_extensions_are_accepted() {
        assert_eq!(allowed_extension("a.JPEG").unwrap(), "jpeg");
        assert_eq!(allowed_extension("a.webp").unwrap(), "webp");
        assert!(allowed_extension("a.gif").is_err());
        assert!(allowed_extension("noext").is_err());
    }

    #[test]
    fn public_id_is_recovered_from_delivery_url() {
        assert_eq!(
            public_id_from_url("https://res.cloudinary.com/demo/image/upload/v1716/podravka/shelf-1.jpg").as_deref(),
            Some("podravka/shelf-1")
        );
        assert_eq!(
            public_id_from_url("https://res.cloudinary.com/demo/image/upload/podravka/65-krem-juhe.png").as_deref(),
            Some("podravka/65-krem-juhe")
        );
        assert_eq!(public_id_from_url("https://example.com/images/a.jpg"), None);
        assert_eq!(public_id_from_url("not a url"), None);
    }

    #[tokio::test]
    async fn disabled_storage_refuses_everything() {
        let storage = DisabledStorage;
        assert!(!storage.is_enabled());
        let upload = PhotoUpload {
            file_name: "a.jpg".into(),
            content_type: None,
            bytes: vec![1, 2, 3],
            custom_name: None,
        };
        assert!(matches!(storage.upload(upload).await, Err(StorageError::NotConfigured)));
        assert!(matches!(storage.destroy("x").await, Err(StorageError::NotConfigured)));
    }
}
