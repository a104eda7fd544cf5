//! All-or-nothing writes for facings and price-check batches.
//!
//! Each accepted submission gets a fresh batch id. Validation and store
//! authorization finish before the first write; every statement after that
//! runs inside one transaction that is committed only when all rows succeed
//! and explicitly rolled back otherwise.

use std::collections::HashMap;

use serde::Serialize;
use sqlx::{PgConnection, Postgres, QueryBuilder};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::database::manager::{rollback_quietly, Database, DatabaseError};
use crate::error::ApiError;
use crate::services::batch_validator::{
    authorize_stores, referenced_stores, validate_competitor_facing_changes, validate_competitor_facings,
    validate_own_facing_changes, validate_own_facings, validate_price_checks, BatchRejection, BatchUpdate,
    CompetitorFacingChange, CompetitorFacingChangeInput, CompetitorFacingInput, NewCompetitorFacing, NewOwnFacing,
    NewPriceCheck, OwnFacingChange, OwnFacingChangeInput, OwnFacingInput, PriceCheckInput, PriceTarget, StoreScoped,
};
use crate::services::brand_resolver::BrandCache;
use crate::types::{Identity, ProductReference};

#[derive(Debug, Error)]
pub enum BatchError {
    #[error(transparent)]
    Rejected(#[from] BatchRejection),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl From<sqlx::Error> for BatchError {
    fn from(err: sqlx::Error) -> Self {
        BatchError::Database(err.into())
    }
}

impl From<BatchError> for ApiError {
    fn from(err: BatchError) -> Self {
        match err {
            BatchError::Rejected(rejection) => rejection.into(),
            BatchError::Database(db) => db.into(),
        }
    }
}

/// What a batch write reports back to the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatchReceipt {
    pub batch_id: Uuid,
    pub affected_rows: u64,
}

/// Tables holding batch-tagged rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchTable {
    OwnFacings,
    CompetitorFacings,
    PriceChecks,
}

impl BatchTable {
    pub fn table_name(&self) -> &'static str {
        match self {
            BatchTable::OwnFacings => "podravka_facings",
            BatchTable::CompetitorFacings => "competitor_facings",
            BatchTable::PriceChecks => "price_checks",
        }
    }
}

/// Run `work` in a transaction, committing on success
macro_rules! transactional {
    ($db:expr, |$conn:ident| $work:expr) => {{
        let mut tx = $db.begin().await?;
        let outcome = {
            let $conn: &mut PgConnection = &mut tx;
            $work.await
        };
        match outcome {
            Ok(value) => {
                tx.commit().await.map_err(DatabaseError::from)?;
                Ok(value)
            }
            Err(e) => {
                rollback_quietly(tx).await;
                Err(e)
            }
        }
    }};
}

/// Map of store id to assigned user id for every referenced store that exists
async fn load_store_owners(conn: &mut PgConnection, store_ids: &[i32]) -> Result<HashMap<i32, Option<i32>>, BatchError> {
    let rows: Vec<(i32, Option<i32>)> = sqlx::query_as("SELECT store_id, user_id FROM stores WHERE store_id = ANY($1)")
        .bind(store_ids)
        .fetch_all(&mut *conn)
        .await?;
    Ok(rows.into_iter().collect())
}

async fn authorize<R: StoreScoped>(conn: &mut PgConnection, identity: &Identity, rows: &[R]) -> Result<(), BatchError> {
    let owners = load_store_owners(conn, &referenced_stores(rows)).await?;
    authorize_stores(identity, rows, &owners)?;
    Ok(())
}

async fn batch_exists(conn: &mut PgConnection, table: BatchTable, batch_id: Uuid, user_id: i32) -> Result<bool, BatchError> {
    let sql = format!(
        "SELECT EXISTS (SELECT 1 FROM {} WHERE batch_id = $1 AND user_id = $2)",
        table.table_name()
    );
    Ok(sqlx::query_scalar(&sql)
        .bind(batch_id)
        .bind(user_id)
        .fetch_one(&mut *conn)
        .await?)
}

// --- Own-brand facings ---------------------------------------------------

pub async fn create_own_facings(
    db: &Database,
    identity: &Identity,
    rows: &[OwnFacingInput],
    max_rows: usize,
) -> Result<BatchReceipt, BatchError> {
    let rows = validate_own_facings(identity, rows, max_rows)?;
    let batch_id = Uuid::new_v4();

    let affected_rows = transactional!(db, |conn| insert_own_facings(conn, identity, &rows, batch_id))?;

    info!(%batch_id, user_id = identity.user_id, rows = affected_rows, "Created own facings batch");
    Ok(BatchReceipt { batch_id, affected_rows })
}

async fn insert_own_facings(
    conn: &mut PgConnection,
    identity: &Identity,
    rows: &[NewOwnFacing],
    batch_id: Uuid,
) -> Result<u64, BatchError> {
    authorize(conn, identity, rows).await?;

    let mut qb: QueryBuilder<Postgres> =
        QueryBuilder::new("INSERT INTO podravka_facings (user_id, store_id, product_id, category, facings_count, batch_id) ");
    qb.push_values(rows, |mut b, row| {
        b.push_bind(row.user_id)
            .push_bind(row.store_id)
            .push_bind(row.product_id)
            .push_bind(row.category.as_str())
            .push_bind(row.facings_count)
            .push_bind(batch_id);
    });

    Ok(qb.build().execute(&mut *conn).await?.rows_affected())
}

pub async fn update_own_facings(
    db: &Database,
    identity: &Identity,
    update: &BatchUpdate<OwnFacingChangeInput>,
    max_rows: usize,
) -> Result<BatchReceipt, BatchError> {
    let (batch_id, changes) = validate_own_facing_changes(identity, update, max_rows)?;

    let affected_rows = transactional!(db, |conn| apply_own_changes(conn, identity, batch_id, &changes))?;

    info!(%batch_id, user_id = identity.user_id, rows = affected_rows, "Updated own facings batch");
    Ok(BatchReceipt { batch_id, affected_rows })
}

async fn apply_own_changes(
    conn: &mut PgConnection,
    identity: &Identity,
    batch_id: Uuid,
    changes: &[OwnFacingChange],
) -> Result<u64, BatchError> {
    if !batch_exists(conn, BatchTable::OwnFacings, batch_id, identity.user_id).await? {
        return Err(BatchRejection::BatchNotFound(batch_id).into());
    }

    let mut affected = 0;
    for change in changes {
        affected += sqlx::query(
            "UPDATE podravka_facings SET facings_count = $1 \
             WHERE batch_id = $2 AND product_id = $3 AND user_id = $4",
        )
        .bind(change.facings_count)
        .bind(batch_id)
        .bind(change.product_id)
        .bind(identity.user_id)
        .execute(&mut *conn)
        .await?
        .rows_affected();
    }
    Ok(affected)
}

// --- Competitor facings --------------------------------------------------

pub async fn create_competitor_facings(
    db: &Database,
    identity: &Identity,
    rows: &[CompetitorFacingInput],
    max_rows: usize,
) -> Result<BatchReceipt, BatchError> {
    let rows = validate_competitor_facings(identity, rows, max_rows)?;
    let batch_id = Uuid::new_v4();

    let affected_rows = transactional!(db, |conn| insert_competitor_facings(conn, identity, &rows, batch_id))?;

    info!(%batch_id, user_id = identity.user_id, rows = affected_rows, "Created competitor facings batch");
    Ok(BatchReceipt { batch_id, affected_rows })
}

async fn insert_competitor_facings(
    conn: &mut PgConnection,
    identity: &Identity,
    rows: &[NewCompetitorFacing],
    batch_id: Uuid,
) -> Result<u64, BatchError> {
    authorize(conn, identity, rows).await?;

    let mut brands = BrandCache::new();
    let mut competitor_ids = Vec::with_capacity(rows.len());
    for row in rows {
        competitor_ids.push(brands.resolve(conn, &row.brand).await?);
    }

    let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
        "INSERT INTO competitor_facings (user_id, store_id, competitor_id, category, facings_count, batch_id) ",
    );
    qb.push_values(rows.iter().zip(competitor_ids), |mut b, (row, competitor_id)| {
        b.push_bind(row.user_id)
            .push_bind(row.store_id)
            .push_bind(competitor_id)
            .push_bind(row.category.as_str())
            .push_bind(row.facings_count)
            .push_bind(batch_id);
    });

    Ok(qb.build().execute(&mut *conn).await?.rows_affected())
}

pub async fn update_competitor_facings(
    db: &Database,
    identity: &Identity,
    update: &BatchUpdate<CompetitorFacingChangeInput>,
    max_rows: usize,
) -> Result<BatchReceipt, BatchError> {
    let (batch_id, changes) = validate_competitor_facing_changes(identity, update, max_rows)?;

    let affected_rows = transactional!(db, |conn| apply_competitor_changes(conn, identity, batch_id, &changes))?;

    info!(%batch_id, user_id = identity.user_id, rows = affected_rows, "Updated competitor facings batch");
    Ok(BatchReceipt { batch_id, affected_rows })
}

async fn apply_competitor_changes(
    conn: &mut PgConnection,
    identity: &Identity,
    batch_id: Uuid,
    changes: &[CompetitorFacingChange],
) -> Result<u64, BatchError> {
    if !batch_exists(conn, BatchTable::CompetitorFacings, batch_id, identity.user_id).await? {
        return Err(BatchRejection::BatchNotFound(batch_id).into());
    }

    let mut affected = 0;
    for change in changes {
        affected += sqlx::query(
            "UPDATE competitor_facings SET facings_count = $1 \
             WHERE batch_id = $2 AND store_id = $3 AND competitor_id = $4 AND category = $5 AND user_id = $6",
        )
        .bind(change.facings_count)
        .bind(batch_id)
        .bind(change.store_id)
        .bind(change.competitor_id)
        .bind(change.category.as_str())
        .bind(identity.user_id)
        .execute(&mut *conn)
        .await?
        .rows_affected();
    }
    Ok(affected)
}

// --- Price checks --------------------------------------------------------

pub async fn create_price_checks(
    db: &Database,
    identity: &Identity,
    rows: &[PriceCheckInput],
    max_rows: usize,
) -> Result<BatchReceipt, BatchError> {
    let rows = validate_price_checks(identity, rows, max_rows)?;
    let batch_id = Uuid::new_v4();

    let affected_rows = transactional!(db, |conn| insert_price_checks(conn, identity, &rows, batch_id))?;

    info!(%batch_id, user_id = identity.user_id, rows = affected_rows, "Created price check batch");
    Ok(BatchReceipt { batch_id, affected_rows })
}

async fn insert_price_checks(
    conn: &mut PgConnection,
    identity: &Identity,
    rows: &[NewPriceCheck],
    batch_id: Uuid,
) -> Result<u64, BatchError> {
    authorize(conn, identity, rows).await?;

    let mut brands = BrandCache::new();
    let mut references = Vec::with_capacity(rows.len());
    for row in rows {
        let reference = match &row.target {
            PriceTarget::Own(product_id) => ProductReference::Own(*product_id),
            PriceTarget::Competitor(brand) => ProductReference::Competitor(brands.resolve(conn, brand).await?),
        };
        references.push(reference);
    }

    let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
        "INSERT INTO price_checks (user_id, store_id, category, product_type, podravka_product_id, competitor_id, \
         regular_price, deal_price, discount_description, batch_id) ",
    );
    qb.push_values(rows.iter().zip(references), |mut b, (row, reference)| {
        b.push_bind(row.user_id)
            .push_bind(row.store_id)
            .push_bind(row.category.as_str())
            .push_bind(reference.product_type())
            .push_bind(reference.own_product_id())
            .push_bind(reference.competitor_id())
            .push_bind(row.regular_price)
            .push_bind(row.deal_price)
            .push_bind(row.discount_description.as_deref())
            .push_bind(batch_id);
    });

    Ok(qb.build().execute(&mut *conn).await?.rows_affected())
}

// --- Deletes -------------------------------------------------------------

/// Remove every row of the caller's batch in one statement; an unknown batch
/// (or one belonging to someone else) is not found.
pub async fn delete_batch(
    db: &Database,
    table: BatchTable,
    identity: &Identity,
    batch_id: Uuid,
) -> Result<BatchReceipt, BatchError> {
    let sql = format!("DELETE FROM {} WHERE batch_id = $1 AND user_id = $2", table.table_name());
    let affected_rows = sqlx::query(&sql)
        .bind(batch_id)
        .bind(identity.user_id)
        .execute(db.pool())
        .await?
        .rows_affected();

    if affected_rows == 0 {
        return Err(BatchRejection::BatchNotFound(batch_id).into());
    }

    info!(%batch_id, user_id = identity.user_id, rows = affected_rows, table = table.table_name(), "Deleted batch");
    Ok(BatchReceipt { batch_id, affected_rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn batch_errors_keep_their_status() {
        let missing: ApiError = BatchError::from(BatchRejection::BatchNotFound(Uuid::nil())).into();
        assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);

        let db: ApiError = BatchError::from(sqlx::Error::PoolTimedOut).into();
        assert_eq!(db.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn batch_tables_name_their_storage() {
        assert_eq!(BatchTable::OwnFacings.table_name(), "podravka_facings");
        assert_eq!(BatchTable::CompetitorFacings.table_name(), "competitor_facings");
        assert_eq!(BatchTable::PriceChecks.table_name(), "price_checks");
    }
}
