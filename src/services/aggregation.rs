//! Facings reports.
//!
//! The competitor report groups own-brand facings by (user, store, category,
//! submission date), pages over those groups, then attaches the competitor
//! facings recorded under the same keys as a brand -> count map. Competitor
//! counts are grouped by brand id; brands sharing a display name within one
//! group are keyed as `"<name> (#<id>)"` so their counts stay separate.

use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::{FromRow, Postgres, QueryBuilder};

use crate::config::ApiConfig;
use crate::database::manager::{Database, DatabaseError};
use crate::database::models::OwnFacingReportRow;
use crate::error::ApiError;
use crate::types::Identity;

/// Query-string filters shared by the facings reports.
///
/// `user_id`, `store_id` and `category` may be repeated to match any of the
/// given values, so the query is read from raw pairs rather than a struct.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportQuery {
    pub user_ids: Vec<i32>,
    pub store_ids: Vec<i32>,
    pub categories: Vec<String>,
    pub business_unit: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

fn parse_param<T: FromStr>(key: &str, value: &str) -> Result<T, ApiError> {
    value
        .parse()
        .map_err(|_| ApiError::field_error(key, format!("Invalid value '{}' for '{}'", value, key)))
}

impl ReportQuery {
    /// Blank values are ignored, as are keys the reports do not know.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Result<Self, ApiError> {
        let mut query = ReportQuery::default();

        for (key, value) in pairs {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            match key.as_str() {
                "user_id" => query.user_ids.push(parse_param(&key, value)?),
                "store_id" => query.store_ids.push(parse_param(&key, value)?),
                "category" => query.categories.push(value.to_string()),
                "business_unit" => query.business_unit = Some(value.to_string()),
                "start_date" => query.start_date = Some(parse_param(&key, value)?),
                "end_date" => query.end_date = Some(parse_param(&key, value)?),
                "limit" => query.limit = Some(parse_param(&key, value)?),
                "offset" => query.offset = Some(parse_param(&key, value)?),
                _ => {}
            }
        }

        Ok(query)
    }
}

/// Filters after scoping to the caller and clamping the page window
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportFilter {
    pub user_ids: Vec<i32>,
    pub store_ids: Vec<i32>,
    pub categories: Vec<String>,
    pub business_unit: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub limit: i64,
    pub offset: i64,
}

impl ReportFilter {
    /// Employees only see their own submissions; admins may filter by any users.
    pub fn scoped(query: ReportQuery, identity: &Identity, api: &ApiConfig) -> Result<Self, ApiError> {
        let user_ids = if identity.is_admin() {
            query.user_ids
        } else {
            if query.user_ids.iter().any(|&requested| requested != identity.user_id) {
                return Err(ApiError::forbidden("You can only view your own reports"));
            }
            vec![identity.user_id]
        };

        let max_limit = api.max_report_limit.max(1);
        Ok(Self {
            user_ids,
            store_ids: query.store_ids,
            categories: query.categories,
            business_unit: query.business_unit,
            start_date: query.start_date,
            end_date: query.end_date,
            limit: query.limit.unwrap_or(api.default_report_limit).clamp(1, max_limit),
            offset: query.offset.unwrap_or(0).max(0),
        })
    }

    /// Narrow `categories` to those the business unit's products belong to.
    /// `None` means nothing can match and the page is empty.
    pub fn restrict_to_unit_categories(mut self, unit_categories: &[String]) -> Option<Self> {
        if unit_categories.is_empty() {
            return None;
        }
        if self.categories.is_empty() {
            self.categories = unit_categories.to_vec();
        } else {
            self.categories.retain(|category| unit_categories.contains(category));
            if self.categories.is_empty() {
                return None;
            }
        }
        Some(self)
    }

    fn empty_page<T>(&self) -> ReportPage<T> {
        ReportPage {
            data: Vec::new(),
            total: 0,
            limit: self.limit,
            offset: self.offset,
        }
    }
}

/// Append `AND ...` conditions for the own-facings alias `pf`.
/// Date bounds apply independently and are inclusive. The business unit is
/// not applied here; each report interprets it.
pub fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &ReportFilter) {
    if !filter.user_ids.is_empty() {
        qb.push(" AND pf.user_id = ANY(").push_bind(filter.user_ids.clone()).push(")");
    }
    if !filter.store_ids.is_empty() {
        qb.push(" AND pf.store_id = ANY(").push_bind(filter.store_ids.clone()).push(")");
    }
    if !filter.categories.is_empty() {
        qb.push(" AND pf.category = ANY(").push_bind(filter.categories.clone()).push(")");
    }
    if let Some(start) = filter.start_date {
        qb.push(" AND pf.created_at::date >= ").push_bind(start);
    }
    if let Some(end) = filter.end_date {
        qb.push(" AND pf.created_at::date <= ").push_bind(end);
    }
}

/// One page of report rows
#[derive(Debug, Clone, Serialize)]
pub struct ReportPage<T> {
    pub data: Vec<T>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

/// Own-brand facings summed per (user, store, category, date)
#[derive(Debug, Clone, FromRow)]
pub struct OwnGroup {
    pub user_id: i32,
    pub username: String,
    pub store_id: i32,
    pub store_name: String,
    pub category: String,
    pub business_unit: Option<String>,
    pub report_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub total_facings: i64,
}

/// Competitor facings summed per group key and brand
#[derive(Debug, Clone, FromRow)]
pub struct CompetitorCell {
    pub user_id: i32,
    pub store_id: i32,
    pub category: String,
    pub report_date: NaiveDate,
    pub competitor_id: i32,
    pub brand_name: String,
    pub facings: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub user: String,
    pub user_id: i32,
    pub store_name: String,
    pub store_id: i32,
    pub category: String,
    pub business_unit: Option<String>,
    pub report_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub total_facings: i64,
    pub competitors: BTreeMap<String, i64>,
    pub total_competitor_facings: i64,
}

type GroupKey = (i32, i32, String, NaiveDate);

/// Left-join competitor cells onto own groups, preserving group order.
/// Groups that differ only by business unit share the same competitor cells.
pub fn merge_report(groups: Vec<OwnGroup>, cells: Vec<CompetitorCell>) -> Vec<ReportRow> {
    let mut by_key: HashMap<GroupKey, Vec<CompetitorCell>> = HashMap::new();
    for cell in cells {
        let key = (cell.user_id, cell.store_id, cell.category.clone(), cell.report_date);
        by_key.entry(key).or_default().push(cell);
    }

    groups
        .into_iter()
        .map(|group| {
            let key = (group.user_id, group.store_id, group.category.clone(), group.report_date);
            let competitors = by_key.get(&key).map(|cells| brand_counts(cells)).unwrap_or_default();
            let total_competitor_facings = competitors.values().sum();

            ReportRow {
                user: group.username,
                user_id: group.user_id,
                store_name: group.store_name,
                store_id: group.store_id,
                category: group.category,
                business_unit: group.business_unit,
                report_date: group.report_date,
                created_at: group.created_at,
                total_facings: group.total_facings,
                competitors,
                total_competitor_facings,
            }
        })
        .collect()
}

/// Brand name -> summed count, one entry per competitor id
fn brand_counts(cells: &[CompetitorCell]) -> BTreeMap<String, i64> {
    let mut ids_per_name: HashMap<&str, Vec<i32>> = HashMap::new();
    for cell in cells {
        let ids = ids_per_name.entry(cell.brand_name.as_str()).or_default();
        if !ids.contains(&cell.competitor_id) {
            ids.push(cell.competitor_id);
        }
    }

    let mut counts = BTreeMap::new();
    for cell in cells {
        let shared = ids_per_name.get(cell.brand_name.as_str()).map_or(false, |ids| ids.len() > 1);
        let key = if shared {
            format!("{} (#{})", cell.brand_name, cell.competitor_id)
        } else {
            cell.brand_name.clone()
        };
        *counts.entry(key).or_insert(0) += cell.facings;
    }
    counts
}

const OWN_GROUP_FROM: &str = "\
    FROM podravka_facings pf \
    JOIN users u ON u.user_id = pf.user_id \
    JOIN stores s ON s.store_id = pf.store_id \
    JOIN podravka_products p ON p.product_id = pf.product_id \
    WHERE TRUE";

/// Distinct categories of the products in a business unit
async fn unit_categories(db: &Database, business_unit: &str) -> Result<Vec<String>, DatabaseError> {
    Ok(sqlx::query_scalar("SELECT DISTINCT category FROM podravka_products WHERE business_unit = $1 ORDER BY category")
        .bind(business_unit)
        .fetch_all(db.pool())
        .await?)
}

/// Own-brand facings with competitor breakdown, newest groups first.
///
/// A business unit selects the categories its products belong to; groups in
/// those categories are reported whole.
pub async fn facings_with_competitors(
    db: &Database,
    filter: &ReportFilter,
) -> Result<ReportPage<ReportRow>, DatabaseError> {
    let resolved;
    let filter = match &filter.business_unit {
        Some(unit) => match filter.clone().restrict_to_unit_categories(&unit_categories(db, unit).await?) {
            Some(narrowed) => {
                resolved = narrowed;
                &resolved
            }
            None => return Ok(filter.empty_page()),
        },
        None => filter,
    };

    let mut count_qb: QueryBuilder<Postgres> = QueryBuilder::new("SELECT COUNT(*) FROM (SELECT 1 ");
    count_qb.push(OWN_GROUP_FROM);
    push_filters(&mut count_qb, filter);
    count_qb.push(" GROUP BY pf.user_id, pf.store_id, pf.category, p.business_unit, pf.created_at::date) g");
    let total: i64 = count_qb.build_query_scalar().fetch_one(db.pool()).await?;

    let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
        "SELECT pf.user_id, u.username, pf.store_id, s.store_name, pf.category, p.business_unit, \
         pf.created_at::date AS report_date, MAX(pf.created_at) AS created_at, \
         SUM(pf.facings_count)::int8 AS total_facings ",
    );
    qb.push(OWN_GROUP_FROM);
    push_filters(&mut qb, filter);
    qb.push(
        " GROUP BY pf.user_id, u.username, pf.store_id, s.store_name, pf.category, p.business_unit, pf.created_at::date \
         ORDER BY MAX(pf.created_at) DESC, pf.user_id, pf.store_id, pf.category",
    );
    qb.push(" LIMIT ").push_bind(filter.limit);
    qb.push(" OFFSET ").push_bind(filter.offset);
    let groups: Vec<OwnGroup> = qb.build_query_as().fetch_all(db.pool()).await?;

    let cells = competitor_cells(db, &groups).await?;

    Ok(ReportPage {
        data: merge_report(groups, cells),
        total,
        limit: filter.limit,
        offset: filter.offset,
    })
}

/// Competitor facings for exactly the given group keys
async fn competitor_cells(db: &Database, groups: &[OwnGroup]) -> Result<Vec<CompetitorCell>, DatabaseError> {
    if groups.is_empty() {
        return Ok(Vec::new());
    }

    let user_ids: Vec<i32> = groups.iter().map(|g| g.user_id).collect();
    let store_ids: Vec<i32> = groups.iter().map(|g| g.store_id).collect();
    let categories: Vec<String> = groups.iter().map(|g| g.category.clone()).collect();
    let dates: Vec<NaiveDate> = groups.iter().map(|g| g.report_date).collect();

    Ok(sqlx::query_as::<_, CompetitorCell>(
        "SELECT k.user_id, k.store_id, k.category, k.report_date, cf.competitor_id, b.brand_name, \
                SUM(cf.facings_count)::int8 AS facings \
         FROM UNNEST($1::int4[], $2::int4[], $3::text[], $4::date[]) AS k(user_id, store_id, category, report_date) \
         JOIN competitor_facings cf \
           ON cf.user_id = k.user_id AND cf.store_id = k.store_id \
          AND cf.category = k.category AND cf.created_at::date = k.report_date \
         JOIN competitor_brands b ON b.competitor_id = cf.competitor_id \
         GROUP BY k.user_id, k.store_id, k.category, k.report_date, cf.competitor_id, b.brand_name",
    )
    .bind(&user_ids)
    .bind(&store_ids)
    .bind(&categories)
    .bind(&dates)
    .fetch_all(db.pool())
    .await?)
}

/// The flat listing has one row per product, so the unit applies to the product itself
fn push_product_unit(qb: &mut QueryBuilder<'_, Postgres>, filter: &ReportFilter) {
    if let Some(business_unit) = &filter.business_unit {
        qb.push(" AND p.business_unit = ").push_bind(business_unit.clone());
    }
}

/// Flat own-brand facings listing with product ranking, newest first
pub async fn own_facings_report(
    db: &Database,
    filter: &ReportFilter,
) -> Result<ReportPage<OwnFacingReportRow>, DatabaseError> {
    let mut count_qb: QueryBuilder<Postgres> = QueryBuilder::new("SELECT COUNT(*) ");
    count_qb.push(OWN_GROUP_FROM);
    push_filters(&mut count_qb, filter);
    push_product_unit(&mut count_qb, filter);
    let total: i64 = count_qb.build_query_scalar().fetch_one(db.pool()).await?;

    let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
        "SELECT pf.podravka_facings_id, pf.user_id, u.username, pf.store_id, s.store_name, \
         pf.product_id, p.name AS product_name, p.business_unit, pf.category, pf.facings_count, \
         r.category_rank, r.sales_share, pf.batch_id, pf.created_at::date AS report_date, pf.created_at ",
    );
    qb.push(
        "FROM podravka_facings pf \
         JOIN users u ON u.user_id = pf.user_id \
         JOIN stores s ON s.store_id = pf.store_id \
         JOIN podravka_products p ON p.product_id = pf.product_id \
         LEFT JOIN LATERAL ( \
             SELECT pr.category_rank, pr.sales_share FROM product_rankings pr \
             WHERE pr.product_id = pf.product_id ORDER BY pr.year DESC LIMIT 1 \
         ) r ON TRUE \
         WHERE TRUE",
    );
    push_filters(&mut qb, filter);
    push_product_unit(&mut qb, filter);
    qb.push(" ORDER BY pf.created_at DESC, pf.podravka_facings_id DESC");
    qb.push(" LIMIT ").push_bind(filter.limit);
    qb.push(" OFFSET ").push_bind(filter.offset);
    let data: Vec<OwnFacingReportRow> = qb.build_query_as().fetch_all(db.pool()).await?;

    Ok(ReportPage {
        data,
        total,
        limit: filter.limit,
        offset: filter.offset,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::types::Role;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn group(store_id: i32, category: &str, total: i64) -> OwnGroup {
        OwnGroup {
            user_id: 1,
            username: "ana".into(),
            store_id,
            store_name: format!("Store {}", store_id),
            category: category.into(),
            business_unit: Some("Culinary".into()),
            report_date: date(2024, 1, 1),
            created_at: Utc::now(),
            total_facings: total,
        }
    }

    fn cell(store_id: i32, competitor_id: i32, brand: &str, facings: i64) -> CompetitorCell {
        CompetitorCell {
            user_id: 1,
            store_id,
            category: "soup".into(),
            report_date: date(2024, 1, 1),
            competitor_id,
            brand_name: brand.into(),
            facings,
        }
    }

    #[test]
    fn group_without_competitors_has_empty_map() {
        let rows = merge_report(vec![group(5, "soup", 10)], vec![]);
        assert_eq!(rows.len(), 1);
        assert!(rows[0].competitors.is_empty());
        assert_eq!(rows[0].total_competitor_facings, 0);
    }

    #[test]
    fn competitor_counts_attach_to_matching_group() {
        let rows = merge_report(
            vec![group(5, "soup", 10)],
            vec![cell(5, 1, "BrandA", 3), cell(5, 2, "BrandB", 2)],
        );
        let row = &rows[0];
        assert_eq!(row.total_facings, 10);
        assert_eq!(row.competitors.get("BrandA"), Some(&3));
        assert_eq!(row.competitors.get("BrandB"), Some(&2));
        assert_eq!(row.total_competitor_facings, 5);
    }

    #[test]
    fn cells_for_other_keys_are_not_attached() {
        let rows = merge_report(
            vec![group(5, "soup", 10), group(6, "soup", 4)],
            vec![cell(6, 1, "BrandA", 7)],
        );
        assert!(rows[0].competitors.is_empty());
        assert_eq!(rows[1].competitors.get("BrandA"), Some(&7));
    }

    #[test]
    fn same_display_name_is_never_merged() {
        let rows = merge_report(
            vec![group(5, "soup", 10)],
            vec![cell(5, 1, "Knorr", 3), cell(5, 9, "Knorr", 4), cell(5, 2, "Maggi", 1)],
        );
        let competitors = &rows[0].competitors;
        assert_eq!(competitors.get("Knorr (#1)"), Some(&3));
        assert_eq!(competitors.get("Knorr (#9)"), Some(&4));
        assert_eq!(competitors.get("Maggi"), Some(&1));
        assert_eq!(competitors.get("Knorr"), None);
        assert_eq!(rows[0].total_competitor_facings, 8);
    }

    #[test]
    fn employees_are_scoped_to_themselves() {
        let api = AppConfig::for_tests().api;
        let employee = Identity::new(4, Role::Employee);

        let filter = ReportFilter::scoped(ReportQuery::default(), &employee, &api).unwrap();
        assert_eq!(filter.user_ids, vec![4]);
        assert_eq!(filter.limit, api.default_report_limit);
        assert_eq!(filter.offset, 0);

        let other = ReportQuery { user_ids: vec![4, 5], ..Default::default() };
        assert!(ReportFilter::scoped(other, &employee, &api).is_err());

        let own = ReportQuery { user_ids: vec![4, 4], ..Default::default() };
        assert_eq!(ReportFilter::scoped(own, &employee, &api).unwrap().user_ids, vec![4]);
    }

    #[test]
    fn admins_may_query_everyone_and_limits_are_clamped() {
        let api = AppConfig::for_tests().api;
        let admin = Identity::new(1, Role::Admin);

        let query = ReportQuery { limit: Some(1_000_000), offset: Some(-3), ..Default::default() };
        let filter = ReportFilter::scoped(query, &admin, &api).unwrap();
        assert!(filter.user_ids.is_empty());
        assert_eq!(filter.limit, api.max_report_limit);
        assert_eq!(filter.offset, 0);
    }

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn repeated_keys_collect_every_value() {
        let query = ReportQuery::from_pairs(pairs(&[
            ("user_id", "1"),
            ("user_id", "2"),
            ("store_id", "7"),
            ("category", "soup"),
            ("category", "spices"),
            ("category", " "),
            ("start_date", "2024-03-01"),
            ("limit", "5"),
            ("unknown", "x"),
        ]))
        .unwrap();

        assert_eq!(query.user_ids, vec![1, 2]);
        assert_eq!(query.store_ids, vec![7]);
        assert_eq!(query.categories, vec!["soup".to_string(), "spices".to_string()]);
        assert_eq!(query.start_date, Some(date(2024, 3, 1)));
        assert_eq!(query.limit, Some(5));

        let admin = Identity::new(1, Role::Admin);
        let filter = ReportFilter::scoped(query, &admin, &AppConfig::for_tests().api).unwrap();
        assert_eq!(filter.user_ids, vec![1, 2]);
    }

    #[test]
    fn malformed_values_name_their_key() {
        let err = ReportQuery::from_pairs(pairs(&[("store_id", "seven")])).unwrap_err();
        assert!(err.to_json()["field_errors"]["store_id"].is_string());

        assert!(ReportQuery::from_pairs(pairs(&[("end_date", "31/03/2024")])).is_err());
    }

    #[test]
    fn business_unit_selects_its_categories() {
        let unit = vec!["soup".to_string(), "spices".to_string()];

        let all = ReportFilter::default().restrict_to_unit_categories(&unit).unwrap();
        assert_eq!(all.categories, unit);

        let asked = ReportFilter { categories: vec!["spices".into(), "desserts".into()], ..Default::default() };
        assert_eq!(asked.restrict_to_unit_categories(&unit).unwrap().categories, vec!["spices".to_string()]);

        let disjoint = ReportFilter { categories: vec!["desserts".into()], ..Default::default() };
        assert!(disjoint.restrict_to_unit_categories(&unit).is_none());
        assert!(ReportFilter::default().restrict_to_unit_categories(&[]).is_none());
    }

    #[test]
    fn groups_split_by_unit_share_competitor_cells() {
        let mut frozen = group(5, "soup", 4);
        frozen.business_unit = Some("Frozen".into());
        let rows = merge_report(vec![group(5, "soup", 10), frozen], vec![cell(5, 1, "BrandA", 3)]);

        assert_eq!(rows[0].business_unit.as_deref(), Some("Culinary"));
        assert_eq!(rows[1].business_unit.as_deref(), Some("Frozen"));
        assert_eq!(rows[0].competitors.get("BrandA"), Some(&3));
        assert_eq!(rows[1].competitors.get("BrandA"), Some(&3));
    }

    #[test]
    fn filters_compose_into_sql() {
        let filter = ReportFilter {
            user_ids: vec![1],
            categories: vec!["soup".into(), "spices".into()],
            business_unit: Some("Culinary".into()),
            start_date: Some(date(2024, 1, 1)),
            limit: 20,
            ..Default::default()
        };
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("SELECT 1 FROM podravka_facings pf WHERE TRUE");
        push_filters(&mut qb, &filter);
        assert_eq!(
            qb.sql(),
            "SELECT 1 FROM podravka_facings pf WHERE TRUE AND pf.user_id = ANY($1) AND pf.category = ANY($2) \
             AND pf.created_at::date >= $3"
        );

        push_product_unit(&mut qb, &filter);
        assert!(qb.sql().ends_with(" AND p.business_unit = $4"));
    }
}
