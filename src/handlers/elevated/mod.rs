// handlers/elevated/mod.rs - Admin handlers
//
// Security Level: JWT with the admin role
// Middleware: JWT validation + require_admin

pub mod competitors;
pub mod photos;
pub mod products;
pub mod stores;
pub mod users;
