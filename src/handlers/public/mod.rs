// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Security Level: None
// Middleware: auth rate limiter on login only

pub mod auth;
pub mod health;

pub use auth::*;
pub use health::{health, root};
