use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::{Database, DatabaseError};
use crate::database::models::{BatchSummary, CompetitorFacing, OwnFacing};

const OWN_COLUMNS: &str =
    "f.podravka_facings_id, f.user_id, f.store_id, f.product_id, f.category, f.facings_count, f.batch_id, f.created_at";

const COMPETITOR_COLUMNS: &str = "f.competitor_facings_id, f.user_id, f.store_id, f.competitor_id, b.brand_name, \
     f.category, f.facings_count, f.batch_id, f.created_at";

/// Read access to submitted facings. `owner` restricts a lookup to one
/// submitter; `None` is reserved for admin callers.
pub struct FacingRepository {
    pool: PgPool,
}

impl FacingRepository {
    pub fn new(db: &Database) -> Self {
        Self { pool: db.pool().clone() }
    }

    pub async fn own_batch(&self, batch_id: Uuid, owner: Option<i32>) -> Result<Vec<OwnFacing>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM podravka_facings f \
             WHERE f.batch_id = $1 AND ($2::int4 IS NULL OR f.user_id = $2) \
             ORDER BY f.podravka_facings_id",
            OWN_COLUMNS
        );
        Ok(sqlx::query_as::<_, OwnFacing>(&sql)
            .bind(batch_id)
            .bind(owner)
            .fetch_all(&self.pool)
            .await?)
    }

    pub async fn competitor_batch(
        &self,
        batch_id: Uuid,
        owner: Option<i32>,
    ) -> Result<Vec<CompetitorFacing>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM competitor_facings f \
             JOIN competitor_brands b ON b.competitor_id = f.competitor_id \
             WHERE f.batch_id = $1 AND ($2::int4 IS NULL OR f.user_id = $2) \
             ORDER BY f.competitor_facings_id",
            COMPETITOR_COLUMNS
        );
        Ok(sqlx::query_as::<_, CompetitorFacing>(&sql)
            .bind(batch_id)
            .bind(owner)
            .fetch_all(&self.pool)
            .await?)
    }

    /// A user's own-brand submissions, one line per batch, newest first
    pub async fn own_batches_for_user(&self, user_id: i32) -> Result<Vec<BatchSummary>, DatabaseError> {
        Ok(sqlx::query_as::<_, BatchSummary>(
            "SELECT f.batch_id, f.store_id, s.store_name, f.category, \
                    COUNT(*) AS row_count, SUM(f.facings_count)::int8 AS total_facings, \
                    MAX(f.created_at) AS created_at \
             FROM podravka_facings f JOIN stores s ON s.store_id = f.store_id \
             WHERE f.user_id = $1 AND f.batch_id IS NOT NULL \
             GROUP BY f.batch_id, f.store_id, s.store_name, f.category \
             ORDER BY MAX(f.created_at) DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?)
    }

    pub async fn competitor_batches_for_user(&self, user_id: i32) -> Result<Vec<BatchSummary>, DatabaseError> {
        Ok(sqlx::query_as::<_, BatchSummary>(
            "SELECT f.batch_id, f.store_id, s.store_name, f.category, \
                    COUNT(*) AS row_count, SUM(f.facings_count)::int8 AS total_facings, \
                    MAX(f.created_at) AS created_at \
             FROM competitor_facings f JOIN stores s ON s.store_id = f.store_id \
             WHERE f.user_id = $1 AND f.batch_id IS NOT NULL \
             GROUP BY f.batch_id, f.store_id, s.store_name, f.category \
             ORDER BY MAX(f.created_at) DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?)
    }
}
