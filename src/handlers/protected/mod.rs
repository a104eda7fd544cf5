// handlers/protected/mod.rs - Protected handlers (JWT authentication required)
//
// Security Level: any authenticated role
// Route Prefix: /api/*
// Middleware: general rate limiter + JWT validation
//
// Rows that belong to a user (batches, photos, reports) are scoped to the
// caller unless the caller is an admin.

pub mod competitor_facings;
pub mod competitors;
pub mod facings;
pub mod photos;
pub mod price_checks;
pub mod products;
pub mod reports;
pub mod stores;
pub mod users;
