pub mod manager;
pub mod models;

pub mod competitors;
pub mod facings;
pub mod photos;
pub mod price_checks;
pub mod products;
pub mod stores;
pub mod users;

pub use manager::{Database, DatabaseError};
