use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ReportPhoto {
    pub photo_id: i32,
    pub photo_type: String,
    pub photo_url: String,
    #[serde(skip_serializing)]
    pub public_id: String,
    pub photo_description: Option<String>,
    pub photo_stage: String,
    pub category: String,
    pub user_id: i32,
    pub store_id: i32,
    pub uploaded_at: DateTime<Utc>,
}

/// Metadata accompanying an uploaded image
#[derive(Debug, Clone)]
pub struct NewPhoto {
    pub photo_type: String,
    pub photo_url: String,
    pub public_id: String,
    pub photo_description: Option<String>,
    pub photo_stage: String,
    pub category: String,
    pub user_id: i32,
    pub store_id: i32,
}
