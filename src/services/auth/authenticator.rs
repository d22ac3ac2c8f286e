use std::sync::Arc;

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use sha2::{Digest, Sha256};

use super::principal::Principal;
use crate::services::token::{TokenDataProvider, TokenError};

/// Token authentication failed. The underlying [`TokenError`] stays reachable through
/// `cause()` and `source()` so logs and audits can tell the reasons apart.
#[derive(Debug, thiserror::Error)]
#[error("token authentication failed")]
pub struct AuthenticationFailed {
    #[source]
    cause: TokenError,
    fingerprint: String,
}

impl AuthenticationFailed {
    pub fn cause(&self) -> &TokenError {
        &self.cause
    }

    /// Short, non-reversible identifier of the rejected token for log correlation.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }
}

/// Turns a raw token into an authenticated [`Principal`].
#[derive(Clone)]
pub struct TokenAuthenticator {
    provider: Arc<dyn TokenDataProvider>,
}

impl TokenAuthenticator {
    pub fn new(provider: Arc<dyn TokenDataProvider>) -> Self {
        Self { provider }
    }

    pub async fn authenticate(&self, raw: &str) -> Result<Principal, AuthenticationFailed> {
        match self.provider.provide(raw).await {
            Ok(data) => {
                let mut principal = Principal::from_token(&data);
                principal.authenticate();
                Ok(principal)
            }
            Err(cause) => Err(AuthenticationFailed {
                cause,
                fingerprint: fingerprint(raw),
            }),
        }
    }
}

// base64url(SHA-256(token)), first 16 characters.
fn fingerprint(raw: &str) -> String {
    let digest = Sha256::digest(raw.as_bytes());
    let mut encoded = URL_SAFE_NO_PAD.encode(digest);
    encoded.truncate(16);
    encoded
}
