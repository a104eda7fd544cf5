use sqlx::{PgConnection, PgPool};

use crate::database::manager::{rollback_quietly, Database, DatabaseError};
use crate::database::models::competitor::{CompetitorInput, CompetitorUpdate};
use crate::database::models::CompetitorBrand;

const BRAND_SELECT: &str = "\
    SELECT b.competitor_id, b.brand_name, \
           COALESCE(array_agg(c.category ORDER BY c.category) FILTER (WHERE c.category IS NOT NULL), '{}') AS categories \
    FROM competitor_brands b \
    LEFT JOIN competitor_brand_categories c ON c.competitor_id = b.competitor_id";

const BRAND_GROUP: &str = "GROUP BY b.competitor_id, b.brand_name";

/// Why a brand cannot be deleted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrandInUse {
    pub facings: i64,
    pub price_checks: i64,
    pub products: i64,
}

pub struct CompetitorRepository {
    pool: PgPool,
}

impl CompetitorRepository {
    pub fn new(db: &Database) -> Self {
        Self { pool: db.pool().clone() }
    }

    pub async fn select_all(&self) -> Result<Vec<CompetitorBrand>, DatabaseError> {
        let sql = format!("{} {} ORDER BY b.brand_name", BRAND_SELECT, BRAND_GROUP);
        Ok(sqlx::query_as::<_, CompetitorBrand>(&sql).fetch_all(&self.pool).await?)
    }

    pub async fn select_one(&self, competitor_id: i32) -> Result<Option<CompetitorBrand>, DatabaseError> {
        let sql = format!("{} WHERE b.competitor_id = $1 {}", BRAND_SELECT, BRAND_GROUP);
        Ok(sqlx::query_as::<_, CompetitorBrand>(&sql)
            .bind(competitor_id)
            .fetch_optional(&self.pool)
            .await?)
    }

    pub async fn select_404(&self, competitor_id: i32) -> Result<CompetitorBrand, DatabaseError> {
        self.select_one(competitor_id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("Competitor {} not found", competitor_id)))
    }

    /// Case-insensitive exact lookup on the trimmed name
    pub async fn find_by_name(&self, brand_name: &str) -> Result<Option<CompetitorBrand>, DatabaseError> {
        let sql = format!("{} WHERE lower(b.brand_name) = lower($1) {}", BRAND_SELECT, BRAND_GROUP);
        Ok(sqlx::query_as::<_, CompetitorBrand>(&sql)
            .bind(brand_name.trim())
            .fetch_optional(&self.pool)
            .await?)
    }

    /// Brands mapped to a category
    pub async fn select_by_category(&self, category: &str) -> Result<Vec<CompetitorBrand>, DatabaseError> {
        let sql = format!(
            "{} WHERE b.competitor_id IN (SELECT competitor_id FROM competitor_brand_categories WHERE category = $1) \
             {} ORDER BY b.brand_name",
            BRAND_SELECT, BRAND_GROUP
        );
        Ok(sqlx::query_as::<_, CompetitorBrand>(&sql)
            .bind(category.trim())
            .fetch_all(&self.pool)
            .await?)
    }

    /// Create a brand with its category mapping in one transaction
    pub async fn insert(&self, input: &CompetitorInput) -> Result<CompetitorBrand, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let created = async {
            let competitor_id: i32 =
                sqlx::query_scalar("INSERT INTO competitor_brands (brand_name) VALUES ($1) RETURNING competitor_id")
                    .bind(input.brand_name.trim())
                    .fetch_one(&mut *tx)
                    .await?;
            replace_categories(&mut tx, competitor_id, &input.categories).await?;
            Ok::<_, DatabaseError>(competitor_id)
        }
        .await;

        match created {
            Ok(competitor_id) => {
                tx.commit().await?;
                self.select_404(competitor_id).await
            }
            Err(e) => {
                rollback_quietly(tx).await;
                Err(e)
            }
        }
    }

    pub async fn update(
        &self,
        competitor_id: i32,
        update: &CompetitorUpdate,
    ) -> Result<Option<CompetitorBrand>, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let updated = async {
            let found = sqlx::query(
                "UPDATE competitor_brands SET brand_name = COALESCE($2, brand_name) WHERE competitor_id = $1",
            )
            .bind(competitor_id)
            .bind(update.brand_name.as_deref().map(str::trim))
            .execute(&mut *tx)
            .await?
            .rows_affected()
                > 0;

            if found {
                if let Some(categories) = &update.categories {
                    replace_categories(&mut tx, competitor_id, categories).await?;
                }
            }
            Ok::<_, DatabaseError>(found)
        }
        .await;

        match updated {
            Ok(true) => {
                tx.commit().await?;
                self.select_one(competitor_id).await
            }
            Ok(false) => {
                rollback_quietly(tx).await;
                Ok(None)
            }
            Err(e) => {
                rollback_quietly(tx).await;
                Err(e)
            }
        }
    }

    /// Count rows that still point at the brand
    pub async fn usage(&self, competitor_id: i32) -> Result<BrandInUse, DatabaseError> {
        let (facings, price_checks, products): (i64, i64, i64) = sqlx::query_as(
            "SELECT \
                (SELECT COUNT(*) FROM competitor_facings WHERE competitor_id = $1), \
                (SELECT COUNT(*) FROM price_checks WHERE competitor_id = $1), \
                (SELECT COUNT(*) FROM competitor_products WHERE competitor_id = $1)",
        )
        .bind(competitor_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(BrandInUse { facings, price_checks, products })
    }

    /// Delete a brand and its category mapping rows
    pub async fn delete(&self, competitor_id: i32) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM competitor_brands WHERE competitor_id = $1")
            .bind(competitor_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

impl BrandInUse {
    pub fn is_referenced(&self) -> bool {
        self.facings > 0 || self.price_checks > 0 || self.products > 0
    }
}

/// Trim, drop blanks and de-duplicate category names, keeping first-seen order
pub fn normalize_categories(categories: &[String]) -> Vec<String> {
    let mut seen = Vec::with_capacity(categories.len());
    for category in categories.iter().map(|c| c.trim()).filter(|c| !c.is_empty()) {
        if !seen.iter().any(|s: &String| s == category) {
            seen.push(category.to_string());
        }
    }
    seen
}

async fn replace_categories(
    conn: &mut PgConnection,
    competitor_id: i32,
    categories: &[String],
) -> Result<(), DatabaseError> {
    sqlx::query("DELETE FROM competitor_brand_categories WHERE competitor_id = $1")
        .bind(competitor_id)
        .execute(&mut *conn)
        .await?;

    let categories = normalize_categories(categories);
    if categories.is_empty() {
        return Ok(());
    }

    sqlx::query(
        "INSERT INTO competitor_brand_categories (competitor_id, category) \
         SELECT $1, unnest($2::text[])",
    )
    .bind(competitor_id)
    .bind(&categories)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_category_lists() {
        let input = vec![
            " Soups ".to_string(),
            "".to_string(),
            "Spices".to_string(),
            "Soups".to_string(),
        ];
        assert_eq!(normalize_categories(&input), vec!["Soups".to_string(), "Spices".to_string()]);
    }

    #[test]
    fn brand_usage_blocks_delete_when_any_reference_exists() {
        let unused = BrandInUse { facings: 0, price_checks: 0, products: 0 };
        assert!(!unused.is_referenced());

        let priced = BrandInUse { facings: 0, price_checks: 2, products: 0 };
        assert!(priced.is_referenced());
    }
}
