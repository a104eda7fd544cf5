use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::types::Role;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub user_id: i32,
    pub username: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Parsed role; an unrecognized stored value degrades to the least privileged role
    pub fn role(&self) -> Role {
        self.role.parse().unwrap_or(Role::Employee)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    #[serde(default = "default_role")]
    pub role: Role,
}

fn default_role() -> Role {
    Role::Employee
}

/// Admin profile edit; absent fields keep their value
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserUpdate {
    pub username: Option<String>,
    pub role: Option<Role>,
    pub password: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_is_never_serialized() {
        let user = User {
            user_id: 1,
            username: "ana".into(),
            password_hash: "$argon2id$secret".into(),
            role: "admin".into(),
            created_at: Utc::now(),
        };
        let value = serde_json::to_value(&user).unwrap();
        assert!(value.get("password_hash").is_none());
        assert_eq!(user.role(), Role::Admin);
    }

    #[test]
    fn new_user_defaults_to_employee() {
        let body: NewUser = serde_json::from_str(r#"{"username":"ivo","password":"longenough"}"#).unwrap();
        assert_eq!(body.role, Role::Employee);
    }
}
