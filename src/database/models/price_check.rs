use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PriceCheck {
    pub price_check_id: i32,
    pub user_id: i32,
    pub store_id: i32,
    pub category: String,
    pub product_type: String,
    pub podravka_product_id: Option<i32>,
    pub competitor_id: Option<i32>,
    /// Own product name or competitor brand name, whichever is referenced
    pub product_name: Option<String>,
    pub regular_price: Decimal,
    pub deal_price: Option<Decimal>,
    pub discount_description: Option<String>,
    pub batch_id: Uuid,
    pub created_at: DateTime<Utc>,
}
