use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Competitor brand with its category mapping rows folded into a list
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CompetitorBrand {
    pub competitor_id: i32,
    pub brand_name: String,
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompetitorInput {
    pub brand_name: String,
    #[serde(default)]
    pub categories: Vec<String>,
}

/// Brand edit; `categories`, when present, replaces the whole mapping
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompetitorUpdate {
    pub brand_name: Option<String>,
    pub categories: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CompetitorProduct {
    pub product_id: i32,
    pub competitor_id: i32,
    pub brand_name: String,
    pub name: String,
    pub category: String,
    pub weight: Option<String>,
    pub created_by: Option<i32>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewCompetitorProduct {
    pub competitor_id: i32,
    pub name: String,
    pub category: String,
    pub weight: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompetitorProductUpdate {
    pub competitor_id: Option<i32>,
    pub name: Option<String>,
    pub category: Option<String>,
    pub weight: Option<String>,
}
