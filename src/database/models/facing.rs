use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One own-brand shelf count
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OwnFacing {
    pub podravka_facings_id: i32,
    pub user_id: i32,
    pub store_id: i32,
    pub product_id: i32,
    pub category: String,
    pub facings_count: i32,
    pub batch_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// One competitor-brand shelf count
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CompetitorFacing {
    pub competitor_facings_id: i32,
    pub user_id: i32,
    pub store_id: i32,
    pub competitor_id: i32,
    pub brand_name: String,
    pub category: String,
    pub facings_count: i32,
    pub batch_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Per-batch rollup shown in a user's submission history
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct BatchSummary {
    pub batch_id: Uuid,
    pub store_id: i32,
    pub store_name: String,
    pub category: String,
    pub row_count: i64,
    pub total_facings: i64,
    pub created_at: DateTime<Utc>,
}

/// Flat own-brand facings report line
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct OwnFacingReportRow {
    pub podravka_facings_id: i32,
    pub user_id: i32,
    pub username: String,
    pub store_id: i32,
    pub store_name: String,
    pub product_id: i32,
    pub product_name: String,
    pub business_unit: Option<String>,
    pub category: String,
    pub facings_count: i32,
    pub category_rank: Option<i32>,
    pub sales_share: Option<Decimal>,
    pub batch_id: Option<Uuid>,
    pub report_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}
