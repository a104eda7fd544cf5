pub mod competitor;
pub mod facing;
pub mod photo;
pub mod price_check;
pub mod product;
pub mod store;
pub mod user;

pub use competitor::{
    CompetitorBrand, CompetitorInput, CompetitorProduct, CompetitorProductUpdate, CompetitorUpdate, NewCompetitorProduct,
};
pub use facing::{BatchSummary, CompetitorFacing, OwnFacing, OwnFacingReportRow};
pub use photo::{NewPhoto, ReportPhoto};
pub use price_check::PriceCheck;
pub use product::{NewProduct, Product, ProductRanking, RankedProduct, RankingInput};
pub use store::{NewStore, Store, StoreUpdate, StoreWithAssignee};
pub use user::{NewUser, User, UserUpdate};

use serde::{Deserialize, Deserializer};

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`)
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::store::StoreUpdate;

    #[test]
    fn store_update_distinguishes_null_from_absent() {
        let absent: StoreUpdate = serde_json::from_str(r#"{"store_name":"Konzum 12"}"#).unwrap();
        assert_eq!(absent.user_id, None);

        let cleared: StoreUpdate = serde_json::from_str(r#"{"user_id":null}"#).unwrap();
        assert_eq!(cleared.user_id, Some(None));

        let assigned: StoreUpdate = serde_json::from_str(r#"{"user_id":4}"#).unwrap();
        assert_eq!(assigned.user_id, Some(Some(4)));
    }
}
