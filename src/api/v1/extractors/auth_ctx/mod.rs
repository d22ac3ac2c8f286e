//! Handlers receive the gate's principal through `AuthCtxExtractor`.
//! `types` is the plain contract, `core` holds the axum glue.

mod core;
mod types;

pub use core::AuthCtxExtractor;
pub use types::AuthCtx;
