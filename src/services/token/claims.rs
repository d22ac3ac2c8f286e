//! Wire-level claim sets.
//!
//! Issued claims are fully typed. Received claims keep every field optional (and the
//! grants claim untyped) so that a missing or mistyped claim is reported by explicit
//! checks in the validator instead of a generic deserialization error.

use serde::{Deserialize, Serialize};

/// Name of the custom claim holding the grant strings.
pub const GRANTS_CLAIM: &str = "grants";

#[derive(Debug, Serialize)]
pub(crate) struct IssuedClaims<'a> {
    pub jti: String,
    pub sub: &'a str,
    pub grants: Vec<&'a str>,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ReceivedClaims {
    #[serde(default)]
    pub jti: Option<String>,
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub grants: Option<serde_json::Value>,
    #[serde(default)]
    pub iat: Option<i64>,
    #[serde(default)]
    pub exp: Option<i64>,
}
