use sqlx::PgPool;

use crate::database::manager::{Database, DatabaseError};
use crate::database::models::store::{NewStore, StoreUpdate};
use crate::database::models::{RankedProduct, Store, StoreWithAssignee};
use crate::database::products::RANKED_PRODUCT_SELECT;
use crate::types::StoreCategory;

const STORE_COLUMNS: &str =
    "s.store_id, s.store_name, s.store_code, s.store_channel, s.store_category, s.sales_rep, s.location, s.user_id, s.created_at";

pub struct StoreRepository {
    pool: PgPool,
}

impl StoreRepository {
    pub fn new(db: &Database) -> Self {
        Self { pool: db.pool().clone() }
    }

    /// All stores with their assignee, optionally narrowed to one channel
    pub async fn select_all(&self, channel: Option<&str>) -> Result<Vec<StoreWithAssignee>, DatabaseError> {
        let sql = format!(
            "SELECT {}, u.username FROM stores s LEFT JOIN users u ON u.user_id = s.user_id \
             WHERE ($1::text IS NULL OR s.store_channel = $1) \
             ORDER BY s.store_name",
            STORE_COLUMNS
        );
        Ok(sqlx::query_as::<_, StoreWithAssignee>(&sql)
            .bind(channel)
            .fetch_all(&self.pool)
            .await?)
    }

    pub async fn select_one(&self, store_id: i32) -> Result<Option<StoreWithAssignee>, DatabaseError> {
        let sql = format!(
            "SELECT {}, u.username FROM stores s LEFT JOIN users u ON u.user_id = s.user_id WHERE s.store_id = $1",
            STORE_COLUMNS
        );
        Ok(sqlx::query_as::<_, StoreWithAssignee>(&sql)
            .bind(store_id)
            .fetch_optional(&self.pool)
            .await?)
    }

    pub async fn select_404(&self, store_id: i32) -> Result<StoreWithAssignee, DatabaseError> {
        self.select_one(store_id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("Store {} not found", store_id)))
    }

    /// Stores assigned to one user
    pub async fn select_by_user(&self, user_id: i32) -> Result<Vec<Store>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM stores s WHERE s.user_id = $1 ORDER BY s.store_name",
            STORE_COLUMNS
        );
        Ok(sqlx::query_as::<_, Store>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?)
    }

    pub async fn insert(&self, store: &NewStore) -> Result<Store, DatabaseError> {
        let sql = format!(
            "INSERT INTO stores AS s (store_name, store_code, store_channel, store_category, sales_rep, location, user_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {}",
            STORE_COLUMNS
        );
        Ok(sqlx::query_as::<_, Store>(&sql)
            .bind(store.store_name.trim())
            .bind(store.store_code.trim())
            .bind(store.store_channel.trim())
            .bind(store.store_category.as_str())
            .bind(store.sales_rep.trim())
            .bind(store.location.trim())
            .bind(store.user_id)
            .fetch_one(&self.pool)
            .await?)
    }

    pub async fn update(&self, store_id: i32, update: &StoreUpdate) -> Result<Option<Store>, DatabaseError> {
        let sql = format!(
            "UPDATE stores AS s SET \
                store_name = COALESCE($2, s.store_name), \
                store_code = COALESCE($3, s.store_code), \
                store_channel = COALESCE($4, s.store_channel), \
                store_category = COALESCE($5, s.store_category), \
                sales_rep = COALESCE($6, s.sales_rep), \
                location = COALESCE($7, s.location), \
                user_id = CASE WHEN $8 THEN $9 ELSE s.user_id END \
             WHERE s.store_id = $1 RETURNING {}",
            STORE_COLUMNS
        );
        Ok(sqlx::query_as::<_, Store>(&sql)
            .bind(store_id)
            .bind(update.store_name.as_deref())
            .bind(update.store_code.as_deref())
            .bind(update.store_channel.as_deref())
            .bind(update.store_category.map(|c| c.as_str()))
            .bind(update.sales_rep.as_deref())
            .bind(update.location.as_deref())
            .bind(update.user_id.is_some())
            .bind(update.user_id.flatten())
            .fetch_optional(&self.pool)
            .await?)
    }

    pub async fn delete(&self, store_id: i32) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM stores WHERE store_id = $1")
            .bind(store_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Catalog a store of `category` may report on
    pub async fn visible_products(&self, category: StoreCategory) -> Result<Vec<RankedProduct>, DatabaseError> {
        let visible: Vec<&str> = category
            .visible_product_categories()
            .iter()
            .map(|c| c.as_str())
            .collect();

        let sql = format!(
            "{} WHERE p.product_category = ANY($1) \
             ORDER BY p.product_category, r.category_rank ASC NULLS LAST, p.name",
            RANKED_PRODUCT_SELECT
        );
        Ok(sqlx::query_as::<_, RankedProduct>(&sql)
            .bind(&visible)
            .fetch_all(&self.pool)
            .await?)
    }
}
