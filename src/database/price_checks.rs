use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::database::manager::{Database, DatabaseError};
use crate::database::models::PriceCheck;

const PRICE_CHECK_SELECT: &str = "SELECT pc.price_check_id, pc.user_id, pc.store_id, pc.category, pc.product_type, \
     pc.podravka_product_id, pc.competitor_id, COALESCE(p.name, b.brand_name) AS product_name, \
     pc.regular_price, pc.deal_price, pc.discount_description, pc.batch_id, pc.created_at \
     FROM price_checks pc \
     LEFT JOIN podravka_products p ON p.product_id = pc.podravka_product_id \
     LEFT JOIN competitor_brands b ON b.competitor_id = pc.competitor_id \
     WHERE TRUE";

/// Listing filters; unset fields do not constrain
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PriceCheckFilter {
    pub user_id: Option<i32>,
    pub store_id: Option<i32>,
    pub category: Option<String>,
    pub product_type: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

pub struct PriceCheckRepository {
    pool: PgPool,
}

impl PriceCheckRepository {
    pub fn new(db: &Database) -> Self {
        Self { pool: db.pool().clone() }
    }

    pub async fn select_filtered(&self, filter: &PriceCheckFilter) -> Result<Vec<PriceCheck>, DatabaseError> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(PRICE_CHECK_SELECT);
        push_price_check_filters(&mut qb, filter);
        qb.push(" ORDER BY pc.created_at DESC, pc.price_check_id DESC");
        if let Some(limit) = filter.limit {
            qb.push(" LIMIT ").push_bind(limit.max(1));
        }
        if let Some(offset) = filter.offset {
            qb.push(" OFFSET ").push_bind(offset.max(0));
        }
        Ok(qb.build_query_as::<PriceCheck>().fetch_all(&self.pool).await?)
    }

    pub async fn select_batch(&self, batch_id: Uuid, owner: Option<i32>) -> Result<Vec<PriceCheck>, DatabaseError> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(PRICE_CHECK_SELECT);
        qb.push(" AND pc.batch_id = ").push_bind(batch_id);
        if let Some(user_id) = owner {
            qb.push(" AND pc.user_id = ").push_bind(user_id);
        }
        qb.push(" ORDER BY pc.price_check_id");
        Ok(qb.build_query_as::<PriceCheck>().fetch_all(&self.pool).await?)
    }
}

fn push_price_check_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &PriceCheckFilter) {
    if let Some(user_id) = filter.user_id {
        qb.push(" AND pc.user_id = ").push_bind(user_id);
    }
    if let Some(store_id) = filter.store_id {
        qb.push(" AND pc.store_id = ").push_bind(store_id);
    }
    if let Some(category) = &filter.category {
        qb.push(" AND pc.category = ").push_bind(category.clone());
    }
    if let Some(product_type) = &filter.product_type {
        qb.push(" AND pc.product_type = ").push_bind(product_type.clone());
    }
    if let Some(start) = filter.start_date {
        qb.push(" AND pc.created_at::date >= ").push_bind(start);
    }
    if let Some(end) = filter.end_date {
        qb.push(" AND pc.created_at::date <= ").push_bind(end);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_filter_adds_no_conditions() {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("WHERE TRUE");
        push_price_check_filters(&mut qb, &PriceCheckFilter::default());
        assert_eq!(qb.sql(), "WHERE TRUE");
    }

    #[test]
    fn filters_bind_in_order() {
        let filter = PriceCheckFilter {
            store_id: Some(3),
            product_type: Some("competitor".into()),
            end_date: NaiveDate::from_ymd_opt(2024, 3, 31),
            ..Default::default()
        };
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("WHERE TRUE");
        push_price_check_filters(&mut qb, &filter);
        assert_eq!(
            qb.sql(),
            "WHERE TRUE AND pc.store_id = $1 AND pc.product_type = $2 AND pc.created_at::date <= $3"
        );
    }
}
