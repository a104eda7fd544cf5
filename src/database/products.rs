use sqlx::PgPool;

use crate::database::manager::{Database, DatabaseError};
use crate::database::models::competitor::{CompetitorProductUpdate, NewCompetitorProduct};
use crate::database::models::product::{NewProduct, RankingInput};
use crate::database::models::{CompetitorProduct, Product, ProductRanking, RankedProduct};

/// Products joined with their most recent ranking year
pub(crate) const RANKED_PRODUCT_SELECT: &str = "\
    SELECT p.product_id, p.category, p.name, p.podravka_code, p.elkos_code, p.product_category, p.business_unit, \
           r.year AS ranking_year, r.category_rank, r.sales_share \
    FROM podravka_products p \
    LEFT JOIN LATERAL ( \
        SELECT pr.year, pr.category_rank, pr.sales_share FROM product_rankings pr \
        WHERE pr.product_id = p.product_id ORDER BY pr.year DESC LIMIT 1 \
    ) r ON TRUE";

const PRODUCT_COLUMNS: &str = "product_id, category, name, podravka_code, elkos_code, product_category, business_unit";

const COMPETITOR_PRODUCT_SELECT: &str = "\
    SELECT cp.product_id, cp.competitor_id, b.brand_name, cp.name, cp.category, cp.weight, cp.created_by, cp.created_at \
    FROM competitor_products cp \
    JOIN competitor_brands b ON b.competitor_id = cp.competitor_id";

pub struct ProductRepository {
    pool: PgPool,
}

impl ProductRepository {
    pub fn new(db: &Database) -> Self {
        Self { pool: db.pool().clone() }
    }

    pub async fn select_all(&self, category: Option<&str>) -> Result<Vec<RankedProduct>, DatabaseError> {
        let sql = format!(
            "{} WHERE ($1::text IS NULL OR p.category = $1) ORDER BY p.category, r.category_rank ASC NULLS LAST, p.name",
            RANKED_PRODUCT_SELECT
        );
        Ok(sqlx::query_as::<_, RankedProduct>(&sql)
            .bind(category)
            .fetch_all(&self.pool)
            .await?)
    }

    pub async fn insert(&self, product: &NewProduct) -> Result<Product, DatabaseError> {
        let sql = format!(
            "INSERT INTO podravka_products (category, name, podravka_code, elkos_code, product_category, business_unit) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
            PRODUCT_COLUMNS
        );
        Ok(sqlx::query_as::<_, Product>(&sql)
            .bind(product.category.trim())
            .bind(product.name.trim())
            .bind(product.podravka_code.trim())
            .bind(product.elkos_code.as_deref())
            .bind(product.product_category.as_str())
            .bind(product.business_unit.as_deref())
            .fetch_one(&self.pool)
            .await?)
    }

    /// Insert or replace the ranking for (product, year)
    pub async fn upsert_ranking(
        &self,
        product_id: i32,
        year: i32,
        ranking: &RankingInput,
    ) -> Result<ProductRanking, DatabaseError> {
        Ok(sqlx::query_as::<_, ProductRanking>(
            "INSERT INTO product_rankings (product_id, year, category_rank, sales_share) VALUES ($1, $2, $3, $4) \
             ON CONFLICT (product_id, year) DO UPDATE \
             SET category_rank = EXCLUDED.category_rank, sales_share = EXCLUDED.sales_share \
             RETURNING product_id, year, category_rank, sales_share",
        )
        .bind(product_id)
        .bind(year)
        .bind(ranking.category_rank)
        .bind(ranking.sales_share)
        .fetch_one(&self.pool)
        .await?)
    }

    pub async fn select_competitor_products(
        &self,
        category: Option<&str>,
        competitor_id: Option<i32>,
    ) -> Result<Vec<CompetitorProduct>, DatabaseError> {
        let sql = format!(
            "{} WHERE ($1::text IS NULL OR cp.category = $1) AND ($2::int4 IS NULL OR cp.competitor_id = $2) \
             ORDER BY b.brand_name, cp.name",
            COMPETITOR_PRODUCT_SELECT
        );
        Ok(sqlx::query_as::<_, CompetitorProduct>(&sql)
            .bind(category)
            .bind(competitor_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn select_competitor_product(&self, product_id: i32) -> Result<Option<CompetitorProduct>, DatabaseError> {
        let sql = format!("{} WHERE cp.product_id = $1", COMPETITOR_PRODUCT_SELECT);
        Ok(sqlx::query_as::<_, CompetitorProduct>(&sql)
            .bind(product_id)
            .fetch_optional(&self.pool)
            .await?)
    }

    pub async fn insert_competitor_product(
        &self,
        product: &NewCompetitorProduct,
        created_by: i32,
    ) -> Result<CompetitorProduct, DatabaseError> {
        let product_id: i32 = sqlx::query_scalar(
            "INSERT INTO competitor_products (competitor_id, name, category, weight, created_by) \
             VALUES ($1, $2, $3, $4, $5) RETURNING product_id",
        )
        .bind(product.competitor_id)
        .bind(product.name.trim())
        .bind(product.category.trim())
        .bind(product.weight.as_deref())
        .bind(created_by)
        .fetch_one(&self.pool)
        .await?;

        self.select_competitor_product(product_id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("Competitor product {} not found", product_id)))
    }

    pub async fn update_competitor_product(
        &self,
        product_id: i32,
        update: &CompetitorProductUpdate,
    ) -> Result<Option<CompetitorProduct>, DatabaseError> {
        let updated = sqlx::query(
            "UPDATE competitor_products SET \
                competitor_id = COALESCE($2, competitor_id), \
                name = COALESCE($3, name), \
                category = COALESCE($4, category), \
                weight = COALESCE($5, weight) \
             WHERE product_id = $1",
        )
        .bind(product_id)
        .bind(update.competitor_id)
        .bind(update.name.as_deref())
        .bind(update.category.as_deref())
        .bind(update.weight.as_deref())
        .execute(&self.pool)
        .await?;

        if updated.rows_affected() == 0 {
            return Ok(None);
        }
        self.select_competitor_product(product_id).await
    }

    pub async fn delete_competitor_product(&self, product_id: i32) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM competitor_products WHERE product_id = $1")
            .bind(product_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
