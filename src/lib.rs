//! Stateless bearer-token authentication for HTTP APIs.
//!
//! Signed tokens carry an identity and its grants. The library issues them
//! (`services::token::TokenCodec`), verifies them (`services::token::TokenValidator`),
//! checks revocation (`services::revocation`) and turns a request into a principal
//! or a classified failure (`services::auth::AuthenticationGate`).
//!
//! The axum wiring in `app`, `middleware` and `api` is one consumer of that core.

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod services;
pub mod state;

#[cfg(test)]
pub(crate) mod test_support;
