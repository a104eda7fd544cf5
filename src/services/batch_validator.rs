//! Whole-batch validation for facings and price-check submissions.
//!
//! Everything here is pure: rows are checked for identity consistency and
//! required fields, then normalized so that every accepted row carries the
//! caller's `user_id`. Store ownership is checked separately by
//! [`authorize_stores`] once the writer has loaded the stores' assignees.
//! Any failing row rejects the entire batch.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use crate::services::brand_resolver::canonical_brand_name;
use crate::types::{BrandRef, Identity};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BatchRejection {
    #[error("Batch must contain at least one row")]
    Empty,

    #[error("Batch has {rows} rows; at most {max} are accepted")]
    TooLarge { rows: usize, max: usize },

    #[error("batch_id is required")]
    MissingBatchId,

    #[error("Row {row} is missing required field '{field}'")]
    MissingField { row: usize, field: &'static str },

    #[error("Row {row} is submitted for user {user_id}; rows may only be submitted for yourself")]
    CrossUser { row: usize, user_id: i32 },

    #[error("Store {store_id} not found")]
    StoreNotFound { store_id: i32 },

    #[error("Store {store_id} is not assigned to you")]
    StoreNotAssigned { store_id: i32 },

    #[error("Row {row}: {reason}")]
    InvalidProductReference { row: usize, reason: String },

    #[error("Batch {0} not found")]
    BatchNotFound(Uuid),
}

// --- Incoming rows -------------------------------------------------------

/// Own-brand facing as submitted
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OwnFacingInput {
    pub user_id: Option<i32>,
    pub store_id: Option<i32>,
    pub product_id: Option<i32>,
    pub category: Option<String>,
    pub facings_count: Option<i32>,
}

/// Competitor facing as submitted; the brand is given by id or by name
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompetitorFacingInput {
    pub user_id: Option<i32>,
    pub store_id: Option<i32>,
    pub competitor_id: Option<i32>,
    #[serde(alias = "name")]
    pub brand_name: Option<String>,
    pub category: Option<String>,
    pub facings_count: Option<i32>,
}

/// Price check as submitted: `product_type` selects which reference applies
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PriceCheckInput {
    pub user_id: Option<i32>,
    pub store_id: Option<i32>,
    pub category: Option<String>,
    pub product_type: Option<String>,
    pub podravka_product_id: Option<i32>,
    pub competitor_id: Option<i32>,
    #[serde(alias = "name")]
    pub brand_name: Option<String>,
    pub regular_price: Option<Decimal>,
    pub deal_price: Option<Decimal>,
    pub discount_description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OwnFacingChangeInput {
    pub user_id: Option<i32>,
    pub product_id: Option<i32>,
    pub facings_count: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompetitorFacingChangeInput {
    pub user_id: Option<i32>,
    pub store_id: Option<i32>,
    pub competitor_id: Option<i32>,
    pub category: Option<String>,
    pub facings_count: Option<i32>,
}

/// Update payload: the batch to change and the rows to overwrite
#[derive(Debug, Clone, Deserialize)]
pub struct BatchUpdate<T> {
    #[serde(alias = "batchId")]
    pub batch_id: Option<Uuid>,
    #[serde(default)]
    pub facings: Vec<T>,
}

// --- Validated rows ------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOwnFacing {
    pub user_id: i32,
    pub store_id: i32,
    pub product_id: i32,
    pub category: String,
    pub facings_count: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCompetitorFacing {
    pub user_id: i32,
    pub store_id: i32,
    pub brand: BrandRef,
    pub category: String,
    pub facings_count: i32,
}

/// Price-check subject before brand names are resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PriceTarget {
    Own(i32),
    Competitor(BrandRef),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPriceCheck {
    pub user_id: i32,
    pub store_id: i32,
    pub category: String,
    pub target: PriceTarget,
    pub regular_price: Decimal,
    pub deal_price: Option<Decimal>,
    pub discount_description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnFacingChange {
    pub product_id: i32,
    pub facings_count: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompetitorFacingChange {
    pub store_id: i32,
    pub competitor_id: i32,
    pub category: String,
    pub facings_count: i32,
}

/// Rows that reference a store, so the writer can check ownership
pub trait StoreScoped {
    fn store_id(&self) -> i32;
}

impl StoreScoped for NewOwnFacing {
    fn store_id(&self) -> i32 {
        self.store_id
    }
}

impl StoreScoped for NewCompetitorFacing {
    fn store_id(&self) -> i32 {
        self.store_id
    }
}

impl StoreScoped for NewPriceCheck {
    fn store_id(&self) -> i32 {
        self.store_id
    }
}

// --- Checks --------------------------------------------------------------

fn check_size<T>(rows: &[T], max_rows: usize) -> Result<(), BatchRejection> {
    if rows.is_empty() {
        return Err(BatchRejection::Empty);
    }
    if rows.len() > max_rows {
        return Err(BatchRejection::TooLarge { rows: rows.len(), max: max_rows });
    }
    Ok(())
}

/// A row may name a user only if it names the caller
fn check_identity(identity: &Identity, row: usize, user_id: Option<i32>) -> Result<(), BatchRejection> {
    match user_id {
        Some(user_id) if user_id != identity.user_id => Err(BatchRejection::CrossUser { row, user_id }),
        _ => Ok(()),
    }
}

fn required<T>(value: Option<T>, row: usize, field: &'static str) -> Result<T, BatchRejection> {
    value.ok_or(BatchRejection::MissingField { row, field })
}

fn required_text(value: Option<&str>, row: usize, field: &'static str) -> Result<String, BatchRejection> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or(BatchRejection::MissingField { row, field })
}

fn brand_reference(
    row: usize,
    competitor_id: Option<i32>,
    brand_name: Option<&str>,
) -> Result<BrandRef, BatchRejection> {
    if let Some(id) = competitor_id {
        return Ok(BrandRef::Id(id));
    }
    brand_name
        .and_then(canonical_brand_name)
        .map(|name| BrandRef::Name(name.to_string()))
        .ok_or(BatchRejection::MissingField { row, field: "competitor_id" })
}

pub fn validate_own_facings(
    identity: &Identity,
    rows: &[OwnFacingInput],
    max_rows: usize,
) -> Result<Vec<NewOwnFacing>, BatchRejection> {
    check_size(rows, max_rows)?;

    rows.iter()
        .enumerate()
        .map(|(i, row)| {
            check_identity(identity, i, row.user_id)?;
            Ok(NewOwnFacing {
                user_id: identity.user_id,
                store_id: required(row.store_id, i, "store_id")?,
                product_id: required(row.product_id, i, "product_id")?,
                category: required_text(row.category.as_deref(), i, "category")?,
                facings_count: required(row.facings_count, i, "facings_count")?,
            })
        })
        .collect()
}

pub fn validate_competitor_facings(
    identity: &Identity,
    rows: &[CompetitorFacingInput],
    max_rows: usize,
) -> Result<Vec<NewCompetitorFacing>, BatchRejection> {
    check_size(rows, max_rows)?;

    rows.iter()
        .enumerate()
        .map(|(i, row)| {
            check_identity(identity, i, row.user_id)?;
            Ok(NewCompetitorFacing {
                user_id: identity.user_id,
                store_id: required(row.store_id, i, "store_id")?,
                category: required_text(row.category.as_deref(), i, "category")?,
                facings_count: required(row.facings_count, i, "facings_count")?,
                brand: brand_reference(i, row.competitor_id, row.brand_name.as_deref())?,
            })
        })
        .collect()
}

fn price_target(row: usize, input: &PriceCheckInput) -> Result<PriceTarget, BatchRejection> {
    let invalid = |reason: &str| BatchRejection::InvalidProductReference { row, reason: reason.to_string() };
    let has_brand_name = input.brand_name.as_deref().and_then(canonical_brand_name).is_some();

    match input.product_type.as_deref().map(str::trim) {
        None | Some("") => Err(BatchRejection::MissingField { row, field: "product_type" }),
        Some("podravka") => {
            if input.competitor_id.is_some() || has_brand_name {
                return Err(invalid("a podravka price check must not reference a competitor"));
            }
            input
                .podravka_product_id
                .map(PriceTarget::Own)
                .ok_or(BatchRejection::MissingField { row, field: "podravka_product_id" })
        }
        Some("competitor") => {
            if input.podravka_product_id.is_some() {
                return Err(invalid("a competitor price check must not reference a podravka product"));
            }
            brand_reference(row, input.competitor_id, input.brand_name.as_deref()).map(PriceTarget::Competitor)
        }
        Some(other) => Err(invalid(&format!(
            "product_type must be 'podravka' or 'competitor', got '{}'",
            other
        ))),
    }
}

pub fn validate_price_checks(
    identity: &Identity,
    rows: &[PriceCheckInput],
    max_rows: usize,
) -> Result<Vec<NewPriceCheck>, BatchRejection> {
    check_size(rows, max_rows)?;

    rows.iter()
        .enumerate()
        .map(|(i, row)| {
            check_identity(identity, i, row.user_id)?;
            Ok(NewPriceCheck {
                user_id: identity.user_id,
                store_id: required(row.store_id, i, "store_id")?,
                category: required_text(row.category.as_deref(), i, "category")?,
                target: price_target(i, row)?,
                regular_price: required(row.regular_price, i, "regular_price")?,
                deal_price: row.deal_price,
                discount_description: row
                    .discount_description
                    .as_deref()
                    .map(str::trim)
                    .filter(|d| !d.is_empty())
                    .map(str::to_string),
            })
        })
        .collect()
}

pub fn validate_own_facing_changes(
    identity: &Identity,
    update: &BatchUpdate<OwnFacingChangeInput>,
    max_rows: usize,
) -> Result<(Uuid, Vec<OwnFacingChange>), BatchRejection> {
    let batch_id = update.batch_id.ok_or(BatchRejection::MissingBatchId)?;
    check_size(&update.facings, max_rows)?;

    let changes = update
        .facings
        .iter()
        .enumerate()
        .map(|(i, row)| {
            check_identity(identity, i, row.user_id)?;
            Ok(OwnFacingChange {
                product_id: required(row.product_id, i, "product_id")?,
                facings_count: required(row.facings_count, i, "facings_count")?,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok((batch_id, changes))
}

pub fn validate_competitor_facing_changes(
    identity: &Identity,
    update: &BatchUpdate<CompetitorFacingChangeInput>,
    max_rows: usize,
) -> Result<(Uuid, Vec<CompetitorFacingChange>), BatchRejection> {
    let batch_id = update.batch_id.ok_or(BatchRejection::MissingBatchId)?;
    check_size(&update.facings, max_rows)?;

    let changes = update
        .facings
        .iter()
        .enumerate()
        .map(|(i, row)| {
            check_identity(identity, i, row.user_id)?;
            Ok(CompetitorFacingChange {
                store_id: required(row.store_id, i, "store_id")?,
                competitor_id: required(row.competitor_id, i, "competitor_id")?,
                category: required_text(row.category.as_deref(), i, "category")?,
                facings_count: required(row.facings_count, i, "facings_count")?,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok((batch_id, changes))
}

/// Every referenced store must exist and, unless the caller is an admin, be
/// assigned to the caller. `owners` maps store id to assigned user id.
pub fn authorize_stores<R: StoreScoped>(
    identity: &Identity,
    rows: &[R],
    owners: &HashMap<i32, Option<i32>>,
) -> Result<(), BatchRejection> {
    for row in rows {
        let store_id = row.store_id();
        let owner = owners
            .get(&store_id)
            .ok_or(BatchRejection::StoreNotFound { store_id })?;

        if !identity.is_admin() && *owner != Some(identity.user_id) {
            return Err(BatchRejection::StoreNotAssigned { store_id });
        }
    }
    Ok(())
}

/// Distinct store ids referenced by a batch
pub fn referenced_stores<R: StoreScoped>(rows: &[R]) -> Vec<i32> {
    let mut ids: Vec<i32> = rows.iter().map(StoreScoped::store_id).collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Role;

    fn employee() -> Identity {
        Identity::new(1, Role::Employee)
    }

    fn own_row(store_id: i32, product_id: i32) -> OwnFacingInput {
        OwnFacingInput {
            user_id: None,
            store_id: Some(store_id),
            product_id: Some(product_id),
            category: Some("soup".into()),
            facings_count: Some(4),
        }
    }

    #[test]
    fn normalizes_user_id_to_caller() {
        let rows = vec![own_row(5, 10), OwnFacingInput { user_id: Some(1), ..own_row(5, 11) }];
        let accepted = validate_own_facings(&employee(), &rows, 10).unwrap();
        assert_eq!(accepted.len(), 2);
        assert!(accepted.iter().all(|r| r.user_id == 1));
    }

    #[test]
    fn one_incomplete_row_rejects_the_batch() {
        let rows = vec![own_row(5, 10), OwnFacingInput { category: None, ..own_row(5, 11) }];
        assert_eq!(
            validate_own_facings(&employee(), &rows, 10),
            Err(BatchRejection::MissingField { row: 1, field: "category" })
        );
    }

    #[test]
    fn blank_category_counts_as_missing() {
        let rows = vec![OwnFacingInput { category: Some("  ".into()), ..own_row(5, 10) }];
        assert!(matches!(
            validate_own_facings(&employee(), &rows, 10),
            Err(BatchRejection::MissingField { field: "category", .. })
        ));
    }

    #[test]
    fn rows_for_another_user_are_forbidden() {
        let rows = vec![OwnFacingInput { user_id: Some(2), ..own_row(5, 10) }];
        assert_eq!(
            validate_own_facings(&employee(), &rows, 10),
            Err(BatchRejection::CrossUser { row: 0, user_id: 2 })
        );
    }

    #[test]
    fn admins_cannot_submit_for_others_either() {
        let admin = Identity::new(9, Role::Admin);
        let rows = vec![OwnFacingInput { user_id: Some(1), ..own_row(5, 10) }];
        assert!(matches!(
            validate_own_facings(&admin, &rows, 10),
            Err(BatchRejection::CrossUser { .. })
        ));
    }

    #[test]
    fn empty_and_oversize_batches_are_rejected() {
        assert_eq!(validate_own_facings(&employee(), &[], 10), Err(BatchRejection::Empty));

        let rows = vec![own_row(5, 10); 3];
        assert_eq!(
            validate_own_facings(&employee(), &rows, 2),
            Err(BatchRejection::TooLarge { rows: 3, max: 2 })
        );
    }

    #[test]
    fn competitor_rows_accept_brand_names() {
        let rows = vec![
            CompetitorFacingInput {
                store_id: Some(5),
                brand_name: Some("  Knorr ".into()),
                category: Some("soup".into()),
                facings_count: Some(3),
                ..Default::default()
            },
            CompetitorFacingInput {
                store_id: Some(5),
                competitor_id: Some(7),
                brand_name: Some("ignored".into()),
                category: Some("soup".into()),
                facings_count: Some(2),
                ..Default::default()
            },
        ];
        let accepted = validate_competitor_facings(&employee(), &rows, 10).unwrap();
        assert_eq!(accepted[0].brand, BrandRef::Name("Knorr".into()));
        assert_eq!(accepted[1].brand, BrandRef::Id(7));
    }

    #[test]
    fn competitor_rows_need_some_brand_reference() {
        let rows = vec![CompetitorFacingInput {
            store_id: Some(5),
            brand_name: Some("   ".into()),
            category: Some("soup".into()),
            facings_count: Some(3),
            ..Default::default()
        }];
        assert_eq!(
            validate_competitor_facings(&employee(), &rows, 10),
            Err(BatchRejection::MissingField { row: 0, field: "competitor_id" })
        );
    }

    fn price_row() -> PriceCheckInput {
        PriceCheckInput {
            store_id: Some(5),
            category: Some("soup".into()),
            product_type: Some("podravka".into()),
            podravka_product_id: Some(10),
            regular_price: Some(Decimal::new(199, 2)),
            ..Default::default()
        }
    }

    #[test]
    fn price_checks_become_tagged_references() {
        let rows = vec![
            price_row(),
            PriceCheckInput {
                product_type: Some("competitor".into()),
                podravka_product_id: None,
                competitor_id: Some(3),
                ..price_row()
            },
        ];
        let accepted = validate_price_checks(&employee(), &rows, 10).unwrap();
        assert_eq!(accepted[0].target, PriceTarget::Own(10));
        assert_eq!(accepted[1].target, PriceTarget::Competitor(BrandRef::Id(3)));
    }

    #[test]
    fn price_check_with_both_references_is_rejected() {
        let rows = vec![PriceCheckInput { competitor_id: Some(3), ..price_row() }];
        assert!(matches!(
            validate_price_checks(&employee(), &rows, 10),
            Err(BatchRejection::InvalidProductReference { row: 0, .. })
        ));
    }

    #[test]
    fn price_check_type_must_match_reference() {
        let rows = vec![PriceCheckInput { podravka_product_id: None, ..price_row() }];
        assert_eq!(
            validate_price_checks(&employee(), &rows, 10),
            Err(BatchRejection::MissingField { row: 0, field: "podravka_product_id" })
        );

        let unknown = vec![PriceCheckInput { product_type: Some("generic".into()), ..price_row() }];
        assert!(matches!(
            validate_price_checks(&employee(), &unknown, 10),
            Err(BatchRejection::InvalidProductReference { .. })
        ));
    }

    #[test]
    fn updates_require_batch_id() {
        let update = BatchUpdate::<OwnFacingChangeInput> {
            batch_id: None,
            facings: vec![OwnFacingChangeInput { product_id: Some(1), facings_count: Some(2), user_id: None }],
        };
        assert_eq!(
            validate_own_facing_changes(&employee(), &update, 10),
            Err(BatchRejection::MissingBatchId)
        );
    }

    #[test]
    fn update_payload_accepts_camel_case_batch_id() {
        let update: BatchUpdate<CompetitorFacingChangeInput> = serde_json::from_str(
            r#"{"batchId":"0b7c7c36-3f55-4a62-9d53-6f0d3c1b8a11","facings":[{"store_id":5,"competitor_id":2,"category":"soup","facings_count":6}]}"#,
        )
        .unwrap();
        let (batch_id, changes) = validate_competitor_facing_changes(&employee(), &update, 10).unwrap();
        assert_eq!(batch_id.to_string(), "0b7c7c36-3f55-4a62-9d53-6f0d3c1b8a11");
        assert_eq!(changes[0].facings_count, 6);
    }

    #[test]
    fn store_authorization() {
        let rows = validate_own_facings(&employee(), &[own_row(5, 10), own_row(6, 10)], 10).unwrap();

        let mut owners = HashMap::new();
        owners.insert(5, Some(1));
        owners.insert(6, Some(2));

        assert_eq!(
            authorize_stores(&employee(), &rows, &owners),
            Err(BatchRejection::StoreNotAssigned { store_id: 6 })
        );
        assert_eq!(authorize_stores(&Identity::new(9, Role::Admin), &rows, &owners), Ok(()));

        owners.remove(&6);
        assert_eq!(
            authorize_stores(&Identity::new(9, Role::Admin), &rows, &owners),
            Err(BatchRejection::StoreNotFound { store_id: 6 })
        );
    }

    #[test]
    fn unassigned_store_is_admin_only() {
        let rows = validate_own_facings(&employee(), &[own_row(5, 10)], 10).unwrap();
        let owners = HashMap::from([(5, None)]);
        assert!(authorize_stores(&employee(), &rows, &owners).is_err());
        assert_eq!(referenced_stores(&rows), vec![5]);
    }
}
