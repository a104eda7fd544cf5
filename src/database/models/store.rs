use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::types::StoreCategory;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Store {
    pub store_id: i32,
    pub store_name: String,
    pub store_code: String,
    pub store_channel: String,
    pub store_category: String,
    pub sales_rep: String,
    pub location: String,
    pub user_id: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl Store {
    pub fn category(&self) -> Result<StoreCategory, String> {
        self.store_category.parse()
    }
}

/// Store joined with the username of its assignee
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct StoreWithAssignee {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub store: Store,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewStore {
    pub store_name: String,
    pub store_code: String,
    pub store_channel: String,
    pub store_category: StoreCategory,
    pub sales_rep: String,
    pub location: String,
    pub user_id: Option<i32>,
}

/// Partial store edit. `user_id: null` unassigns the store; omitting it keeps
/// the current assignee.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreUpdate {
    pub store_name: Option<String>,
    pub store_code: Option<String>,
    pub store_channel: Option<String>,
    pub store_category: Option<StoreCategory>,
    pub sales_rep: Option<String>,
    pub location: Option<String>,
    #[serde(default, deserialize_with = "crate::database::models::double_option")]
    pub user_id: Option<Option<i32>>,
}
