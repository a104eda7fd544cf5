use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::types::StoreCategory;

/// Own-brand catalog entry
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub product_id: i32,
    pub category: String,
    pub name: String,
    pub podravka_code: String,
    pub elkos_code: Option<String>,
    pub product_category: String,
    pub business_unit: Option<String>,
}

/// Product with its most recent yearly ranking, if any
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct RankedProduct {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub product: Product,
    pub ranking_year: Option<i32>,
    pub category_rank: Option<i32>,
    pub sales_share: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProductRanking {
    pub product_id: i32,
    pub year: i32,
    pub category_rank: i32,
    pub sales_share: Option<Decimal>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
    pub category: String,
    pub name: String,
    pub podravka_code: String,
    pub elkos_code: Option<String>,
    pub product_category: StoreCategory,
    pub business_unit: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RankingInput {
    pub category_rank: i32,
    pub sales_share: Option<Decimal>,
}
