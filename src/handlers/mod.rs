// handlers/mod.rs - Three-tier handler layout
//
// Public (no auth) → Protected (JWT) → Elevated (JWT + admin role)

pub mod elevated;
pub mod protected;
pub mod public;
