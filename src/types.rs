/// Shared types used across the codebase

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Access role carried in tokens and stored on the user row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Employee,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Employee => "employee",
        }
    }

    /// Elevated roles may act on any store, not just the ones assigned to them
    pub fn is_elevated(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "employee" => Ok(Role::Employee),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// The verified caller of a request: who they are and what they may do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub user_id: i32,
    pub role: Role,
}

impl Identity {
    pub fn new(user_id: i32, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_elevated()
    }
}

/// Store assortment tier. A store of category K reports on products of category >= K.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StoreCategory {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
}

impl StoreCategory {
    pub const ALL: [StoreCategory; 7] = [
        StoreCategory::A,
        StoreCategory::B,
        StoreCategory::C,
        StoreCategory::D,
        StoreCategory::E,
        StoreCategory::F,
        StoreCategory::G,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StoreCategory::A => "A",
            StoreCategory::B => "B",
            StoreCategory::C => "C",
            StoreCategory::D => "D",
            StoreCategory::E => "E",
            StoreCategory::F => "F",
            StoreCategory::G => "G",
        }
    }

    /// Product categories a store of this category may report on, in order
    pub fn visible_product_categories(&self) -> Vec<StoreCategory> {
        Self::ALL.iter().copied().filter(|c| c >= self).collect()
    }
}

impl fmt::Display for StoreCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StoreCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "A" => Ok(StoreCategory::A),
            "B" => Ok(StoreCategory::B),
            "C" => Ok(StoreCategory::C),
            "D" => Ok(StoreCategory::D),
            "E" => Ok(StoreCategory::E),
            "F" => Ok(StoreCategory::F),
            "G" => Ok(StoreCategory::G),
            other => Err(format!("invalid store category '{}'", other)),
        }
    }
}

/// What a price check is about: one of our own products or a competitor brand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "product_type", content = "id", rename_all = "lowercase")]
pub enum ProductReference {
    #[serde(rename = "podravka")]
    Own(i32),
    Competitor(i32),
}

impl ProductReference {
    pub fn product_type(&self) -> &'static str {
        match self {
            ProductReference::Own(_) => "podravka",
            ProductReference::Competitor(_) => "competitor",
        }
    }

    pub fn own_product_id(&self) -> Option<i32> {
        match self {
            ProductReference::Own(id) => Some(*id),
            ProductReference::Competitor(_) => None,
        }
    }

    pub fn competitor_id(&self) -> Option<i32> {
        match self {
            ProductReference::Own(_) => None,
            ProductReference::Competitor(id) => Some(*id),
        }
    }
}

/// A competitor brand as referenced by a client, before resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrandRef {
    Id(i32),
    Name(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_category_b_sees_b_through_g() {
        let visible: Vec<&str> = StoreCategory::B
            .visible_product_categories()
            .iter()
            .map(|c| c.as_str())
            .collect();
        assert_eq!(visible, vec!["B", "C", "D", "E", "F", "G"]);
    }

    #[test]
    fn store_category_a_sees_everything() {
        assert_eq!(StoreCategory::A.visible_product_categories().len(), 7);
        assert_eq!(StoreCategory::G.visible_product_categories(), vec![StoreCategory::G]);
    }

    #[test]
    fn parses_roles_case_insensitively() {
        assert_eq!("Admin".parse::<Role>(), Ok(Role::Admin));
        assert_eq!("employee".parse::<Role>(), Ok(Role::Employee));
        assert!("root".parse::<Role>().is_err());
        assert!(Role::Admin.is_elevated());
        assert!(!Role::Employee.is_elevated());
    }

    #[test]
    fn rejects_unknown_store_category() {
        assert!("H".parse::<StoreCategory>().is_err());
        assert_eq!("c".parse::<StoreCategory>().ok(), None);
    }

    #[test]
    fn product_reference_exposes_exactly_one_id() {
        let own = ProductReference::Own(4);
        assert_eq!(own.product_type(), "podravka");
        assert_eq!((own.own_product_id(), own.competitor_id()), (Some(4), None));

        let rival = ProductReference::Competitor(9);
        assert_eq!(rival.product_type(), "competitor");
        assert_eq!((rival.own_product_id(), rival.competitor_id()), (None, Some(9)));
    }
}
