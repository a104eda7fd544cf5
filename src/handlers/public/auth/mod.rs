// handlers/public/auth/mod.rs - Token acquisition

pub mod login; // POST /api/users/login

pub use login::login_post;
