//! Token verification and claim validation.
//!
//! `decode` runs two phases:
//!
//! 1. `jsonwebtoken` parses the compact form, checks the header algorithm, verifies the
//!    signature and enforces `exp` (presence and expiry).
//! 2. Explicit checks on the verified claims, in this order: token id present and an
//!    `i64`, subject present, grants present and a list of strings (unresolvable entries
//!    are dropped), issued-at present and not in the future, expiration present.
//!
//! Every failure is a [`TokenDecodingError`]; nothing here logs. Callers never receive a
//! partially populated [`TokenData`].

use std::collections::BTreeSet;
use std::sync::Arc;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};

use super::claims::{GRANTS_CLAIM, ReceivedClaims};
use super::data::{Grant, TokenData};
use super::grants::GrantResolver;
use super::keys::{self, KeyError};

/// Tokens larger than this are rejected before any parsing.
pub const MAX_TOKEN_SIZE_BYTES: usize = 8192;

#[derive(Debug, thiserror::Error)]
pub enum TokenDecodingError {
    /// Caller error: there was nothing to decode.
    #[error("token must not be empty")]
    EmptyToken,

    #[error("token decoding failed: malformed token ({reason})")]
    Malformed {
        reason: &'static str,
        #[source]
        source: Option<jsonwebtoken::errors::Error>,
    },

    #[error("token decoding failed: bad signature")]
    BadSignature(#[source] jsonwebtoken::errors::Error),

    #[error("token decoding failed: token expired")]
    Expired(#[source] jsonwebtoken::errors::Error),

    #[error("token decoding failed: missing required claim '{0}'")]
    MissingClaim(String),
}

impl TokenDecodingError {
    fn malformed(reason: &'static str) -> Self {
        Self::Malformed {
            reason,
            source: None,
        }
    }
}

impl From<jsonwebtoken::errors::Error> for TokenDecodingError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::InvalidSignature => Self::BadSignature(err),
            ErrorKind::ExpiredSignature => Self::Expired(err),
            ErrorKind::MissingRequiredClaim(claim) => Self::MissingClaim(claim.clone()),
            ErrorKind::InvalidAlgorithm => Self::Malformed {
                reason: "unexpected signature algorithm",
                source: Some(err),
            },
            ErrorKind::Json(_) => Self::Malformed {
                reason: "claims are not valid JSON of the expected shape",
                source: Some(err),
            },
            _ => Self::Malformed {
                reason: "not a valid signed token",
                source: Some(err),
            },
        }
    }
}

/// Verifies tokens issued by [`TokenCodec`](super::codec::TokenCodec) and turns them
/// back into [`TokenData`].
///
/// - Key material is intentionally not printable via Debug.
#[derive(Clone)]
pub struct TokenValidator {
    decoding_key: DecodingKey,
    validation: Validation,
    leeway_seconds: u64,
    grants: Arc<dyn GrantResolver>,
}

impl std::fmt::Debug for TokenValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("TokenValidator")
            .field("validation", &self.validation)
            .finish()
    }
}

impl TokenValidator {
    /// `public_key` must be an X.509 public key (PEM or base64 DER) matching `algorithm`.
    pub fn new(
        public_key: &str,
        algorithm: Algorithm,
        leeway_seconds: u64,
        grants: Arc<dyn GrantResolver>,
    ) -> Result<Self, KeyError> {
        let decoding_key = keys::verification_key(algorithm, public_key)?;
        Ok(Self::from_key(decoding_key, algorithm, leeway_seconds, grants))
    }

    pub fn from_key(
        decoding_key: DecodingKey,
        algorithm: Algorithm,
        leeway_seconds: u64,
        grants: Arc<dyn GrantResolver>,
    ) -> Self {
        let mut validation = Validation::new(algorithm);
        validation.leeway = leeway_seconds;
        validation.validate_exp = true;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            decoding_key,
            validation,
            leeway_seconds,
            grants,
        }
    }

    /// Verify `raw` and return the identity it carries.
    pub fn decode(&self, raw: &str) -> Result<TokenData, TokenDecodingError> {
        if raw.trim().is_empty() {
            return Err(TokenDecodingError::EmptyToken);
        }
        if raw.len() > MAX_TOKEN_SIZE_BYTES {
            return Err(TokenDecodingError::malformed("token exceeds maximum size"));
        }

        let verified =
            jsonwebtoken::decode::<ReceivedClaims>(raw, &self.decoding_key, &self.validation)?;

        self.validate_claims(verified.claims, chrono::Utc::now().timestamp())
    }

    fn validate_claims(
        &self,
        claims: ReceivedClaims,
        now: i64,
    ) -> Result<TokenData, TokenDecodingError> {
        let jti = claims
            .jti
            .filter(|jti| !jti.trim().is_empty())
            .ok_or_else(|| TokenDecodingError::MissingClaim("jti".to_string()))?;
        let id = jti
            .trim()
            .parse::<i64>()
            .map_err(|_| TokenDecodingError::malformed("token id is not an integer"))?;

        let username = claims
            .sub
            .ok_or_else(|| TokenDecodingError::MissingClaim("sub".to_string()))?;

        let raw_grants = claims
            .grants
            .ok_or_else(|| TokenDecodingError::MissingClaim(GRANTS_CLAIM.to_string()))?;
        let grants = self.resolve_grants(&raw_grants)?;

        let iat = claims
            .iat
            .ok_or_else(|| TokenDecodingError::MissingClaim("iat".to_string()))?;
        let leeway = i64::try_from(self.leeway_seconds).unwrap_or(i64::MAX);
        let latest_acceptable_iat = now.saturating_add(leeway);
        if iat > latest_acceptable_iat {
            return Err(TokenDecodingError::malformed("issued-at lies in the future"));
        }

        // jsonwebtoken already requires `exp`; keep the explicit guard anyway.
        if claims.exp.is_none() {
            return Err(TokenDecodingError::MissingClaim("exp".to_string()));
        }

        Ok(TokenData::new(id, username, grants))
    }

    // Unknown grant strings are dropped, not fatal: a token that references a grant this
    // service no longer knows keeps working with the remaining grants.
    fn resolve_grants(&self, raw: &serde_json::Value) -> Result<BTreeSet<Grant>, TokenDecodingError> {
        let items = raw
            .as_array()
            .ok_or_else(|| TokenDecodingError::malformed("grants claim is not a list"))?;

        let mut grants = BTreeSet::new();
        for item in items {
            let name = item
                .as_str()
                .ok_or_else(|| TokenDecodingError::malformed("grants claim contains a non-string"))?;
            if let Some(grant) = self.grants.resolve(name) {
                grants.insert(grant);
            }
        }
        Ok(grants)
    }
}
