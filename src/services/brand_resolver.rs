// Find-or-create for competitor brands referenced by name.
//
// The unique index on lower(brand_name) lets the insert double as the
// existence check, so two concurrent submissions naming the same new brand
// converge on one row instead of racing a read-then-write.

use std::collections::HashMap;

use sqlx::PgConnection;

use crate::database::manager::DatabaseError;
use crate::types::BrandRef;

/// Trimmed brand name, or `None` when nothing is left
pub fn canonical_brand_name(name: &str) -> Option<&str> {
    let trimmed = name.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// Resolve a brand name to its competitor id, inserting the brand if unseen.
/// Matching is case-insensitive on the trimmed name. Runs on the caller's
/// connection so a failure aborts the caller's transaction.
pub async fn resolve_brand(conn: &mut PgConnection, name: &str) -> Result<i32, DatabaseError> {
    let name = name.trim();

    let inserted: Option<i32> = sqlx::query_scalar(
        "INSERT INTO competitor_brands (brand_name) VALUES ($1) \
         ON CONFLICT ((lower(brand_name))) DO NOTHING \
         RETURNING competitor_id",
    )
    .bind(name)
    .fetch_optional(&mut *conn)
    .await?;

    if let Some(competitor_id) = inserted {
        tracing::info!(competitor_id, brand = name, "Registered new competitor brand");
        return Ok(competitor_id);
    }

    let existing: i32 = sqlx::query_scalar("SELECT competitor_id FROM competitor_brands WHERE lower(brand_name) = lower($1)")
        .bind(name)
        .fetch_one(&mut *conn)
        .await?;
    Ok(existing)
}

/// Resolves brand references for one batch, hitting the database once per
/// distinct name.
#[derive(Debug, Default)]
pub struct BrandCache {
    resolved: HashMap<String, i32>,
}

impl BrandCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn resolve(&mut self, conn: &mut PgConnection, brand: &BrandRef) -> Result<i32, DatabaseError> {
        match brand {
            BrandRef::Id(id) => Ok(*id),
            BrandRef::Name(name) => {
                let key = name.trim().to_lowercase();
                if let Some(id) = self.resolved.get(&key) {
                    return Ok(*id);
                }
                let id = resolve_brand(conn, name).await?;
                self.resolved.insert(key, id);
                Ok(id)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_name_trims_and_rejects_blank() {
        assert_eq!(canonical_brand_name("  Knorr "), Some("Knorr"));
        assert_eq!(canonical_brand_name("   "), None);
        assert_eq!(canonical_brand_name(""), None);
    }
}
