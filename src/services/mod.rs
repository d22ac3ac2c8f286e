pub mod auth;
pub mod cache;
pub mod revocation;
pub mod token;
