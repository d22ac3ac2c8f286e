use jsonwebtoken::{Algorithm, EncodingKey, Header};

use super::claims::IssuedClaims;
use super::data::{Grant, TokenData};
use super::keys::{self, KeyError};

#[derive(Debug, thiserror::Error)]
pub enum TokenEncodingError {
    #[error("token lifetime overflows the expiration timestamp")]
    LifetimeOverflow,
    #[error("failed to sign token: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}

/// Issues signed tokens.
///
/// The produced token is a JWS compact serialization (`header.payload.signature`) whose
/// claims are the token id (stringified), subject, grants, issued-at and expiration.
///
/// - Key material is intentionally not printable via Debug.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    algorithm: Algorithm,
    lifetime_seconds: u64,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &self.algorithm)
            .field("lifetime_seconds", &self.lifetime_seconds)
            .finish()
    }
}

impl TokenCodec {
    /// `private_key` must be a PKCS#8 key (PEM or base64 DER) matching `algorithm`.
    pub fn new(
        private_key: &str,
        algorithm: Algorithm,
        lifetime_seconds: u64,
    ) -> Result<Self, KeyError> {
        let encoding_key = keys::signing_key(algorithm, private_key)?;
        Ok(Self::from_key(encoding_key, algorithm, lifetime_seconds))
    }

    pub fn from_key(encoding_key: EncodingKey, algorithm: Algorithm, lifetime_seconds: u64) -> Self {
        Self {
            encoding_key,
            algorithm,
            lifetime_seconds,
        }
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn lifetime_seconds(&self) -> u64 {
        self.lifetime_seconds
    }

    /// Encode `token` as a signed token valid from now until now + lifetime.
    pub fn encode(&self, token: &TokenData) -> Result<String, TokenEncodingError> {
        let now = chrono::Utc::now().timestamp();
        let exp = i64::try_from(self.lifetime_seconds)
            .ok()
            .and_then(|lifetime| now.checked_add(lifetime))
            .ok_or(TokenEncodingError::LifetimeOverflow)?;

        let claims = IssuedClaims {
            jti: token.id().to_string(),
            sub: token.username(),
            grants: token.grants().iter().map(Grant::as_str).collect(),
            iat: now,
            exp,
        };

        let mut header = Header::new(self.algorithm);
        header.typ = Some("JWT".to_string());
        Ok(jsonwebtoken::encode(&header, &claims, &self.encoding_key)?)
    }
}
