//! Shared fixtures for unit tests.

use std::sync::Arc;

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use jsonwebtoken::{Algorithm, Header};

use crate::services::auth::{AuthenticationGate, RouteMatcher, TokenAuthenticator};
use crate::services::revocation::StaticRevocationChecker;
use crate::services::token::{
    JwtTokenDataProvider, RoleGrantResolver, TokenCodec, TokenValidator, keys,
};
use crate::state::AppState;

pub const RSA_PRIVATE_PEM: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures/rsa_private.pem"));
pub const RSA_PUBLIC_PEM: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures/rsa_public.pem"));
pub const RSA_OTHER_PUBLIC_PEM: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures/rsa_other_public.pem"));
pub const ED25519_PRIVATE_PEM: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures/ed25519_private.pem"));
pub const ED25519_PUBLIC_PEM: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures/ed25519_public.pem"));

pub fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// RS512 codec over the RSA fixture key.
pub fn test_codec(lifetime_seconds: u64) -> TokenCodec {
    TokenCodec::new(RSA_PRIVATE_PEM, Algorithm::RS512, lifetime_seconds).expect("fixture key")
}

/// RS512 validator with no leeway and role grants.
pub fn test_validator() -> TokenValidator {
    TokenValidator::new(RSA_PUBLIC_PEM, Algorithm::RS512, 0, Arc::new(RoleGrantResolver))
        .expect("fixture key")
}

/// Bearer gate over [`test_validator`], static revocation list, `GET /health` optional.
pub fn test_gate(revoked: &[i64]) -> AuthenticationGate {
    let provider = JwtTokenDataProvider::new(Arc::new(test_validator()))
        .with_revocation_checker(Arc::new(StaticRevocationChecker::new(revoked.to_vec())));

    AuthenticationGate::new(
        axum::http::header::AUTHORIZATION,
        "Bearer",
        TokenAuthenticator::new(Arc::new(provider)),
    )
    .with_optional_routes(RouteMatcher::parse_list("GET /health").expect("valid routes"))
}

pub fn test_state(revoked: &[i64], issuance: bool) -> AppState {
    let codec = issuance.then(|| Arc::new(test_codec(600)));
    AppState::new(Arc::new(test_gate(revoked)), codec)
}

/// Sign arbitrary claims, bypassing `TokenCodec`, to build tokens it would never issue.
pub fn sign_claims(private_pem: &str, algorithm: Algorithm, claims: &serde_json::Value) -> String {
    let key = keys::signing_key(algorithm, private_pem).expect("fixture key");
    jsonwebtoken::encode(&Header::new(algorithm), claims, &key).expect("sign")
}

/// Decode one segment (0 = header, 1 = claims) of a compact token as JSON.
pub fn decode_segment(token: &str, index: usize) -> serde_json::Value {
    let segment = token.split('.').nth(index).expect("segment");
    let bytes = URL_SAFE_NO_PAD.decode(segment).expect("base64url");
    serde_json::from_slice(&bytes).expect("json")
}

/// Base64 body of a PEM document, without armor or line breaks.
pub fn pem_body(pem: &str) -> String {
    pem.lines().filter(|line| !line.starts_with("-----")).collect()
}
