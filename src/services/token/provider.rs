use std::sync::Arc;

use async_trait::async_trait;

use super::data::TokenData;
use super::validator::{TokenDecodingError, TokenValidator};
use crate::services::revocation::{FailClosedRevocationChecker, RevocationChecker, RevocationError};

/// Why a raw token did not yield [`TokenData`].
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error(transparent)]
    Decoding(#[from] TokenDecodingError),

    // The id stays out of Display; logs read it from the field.
    #[error("blacklisted token")]
    Blacklisted { token_id: i64 },

    #[error("revocation check unavailable")]
    RevocationUnavailable(#[from] RevocationError),
}

/// The single contract the request layer consumes: raw token in, verified and
/// non-revoked identity out.
#[async_trait]
pub trait TokenDataProvider: Send + Sync {
    async fn provide(&self, raw: &str) -> Result<TokenData, TokenError>;
}

#[derive(Debug, thiserror::Error)]
#[error("no revocation checker configured; refusing to start with the fail-closed default")]
pub struct RevocationNotWired;

/// Validator followed by a revocation lookup.
#[derive(Clone)]
pub struct JwtTokenDataProvider {
    validator: Arc<TokenValidator>,
    revocation: Arc<dyn RevocationChecker>,
}

impl std::fmt::Debug for JwtTokenDataProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtTokenDataProvider")
            .field("validator", &self.validator)
            .field("revocation", &self.revocation.backend_name())
            .finish()
    }
}

impl JwtTokenDataProvider {
    /// Starts with [`FailClosedRevocationChecker`]: every token is rejected until a real
    /// checker is set.
    pub fn new(validator: Arc<TokenValidator>) -> Self {
        Self {
            validator,
            revocation: Arc::new(FailClosedRevocationChecker),
        }
    }

    pub fn with_revocation_checker(mut self, revocation: Arc<dyn RevocationChecker>) -> Self {
        self.revocation = revocation;
        self
    }

    /// Startup guard: fails if no real revocation checker replaced the default.
    pub fn ensure_revocation_wired(&self) -> Result<(), RevocationNotWired> {
        if self.revocation.is_fail_closed_default() {
            return Err(RevocationNotWired);
        }
        Ok(())
    }

    pub fn revocation_backend(&self) -> &'static str {
        self.revocation.backend_name()
    }
}

#[async_trait]
impl TokenDataProvider for JwtTokenDataProvider {
    async fn provide(&self, raw: &str) -> Result<TokenData, TokenError> {
        let data = self.validator.decode(raw)?;

        if self.revocation.is_blacklisted(data.id()).await? {
            return Err(TokenError::Blacklisted { token_id: data.id() });
        }

        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::cache::CacheError;
    use crate::services::revocation::StaticRevocationChecker;
    use crate::services::token::data::Grant;
    use crate::test_support::{test_codec, test_validator};

    struct BrokenChecker;

    #[async_trait]
    impl RevocationChecker for BrokenChecker {
        fn backend_name(&self) -> &'static str {
            "broken"
        }

        async fn is_blacklisted(&self, _token_id: i64) -> Result<bool, RevocationError> {
            Err(CacheError::BackendCommand("timeout".to_string()).into())
        }
    }

    fn provider(checker: Arc<dyn RevocationChecker>) -> JwtTokenDataProvider {
        JwtTokenDataProvider::new(Arc::new(test_validator())).with_revocation_checker(checker)
    }

    fn token(id: i64) -> String {
        test_codec(600)
            .encode(&TokenData::new(id, "alice", [Grant::new("role-user")]))
            .expect("encode")
    }

    #[tokio::test]
    async fn provides_data_for_valid_unrevoked_token() {
        let provider = provider(Arc::new(StaticRevocationChecker::new([])));

        let data = provider.provide(&token(42)).await.expect("valid token");
        assert_eq!(data.id(), 42);
        assert_eq!(data.username(), "alice");
    }

    #[tokio::test]
    async fn blacklisted_token_fails_even_though_it_decodes() {
        let raw = token(42);
        assert!(test_validator().decode(&raw).is_ok());

        let provider = provider(Arc::new(StaticRevocationChecker::new([42])));

        assert!(matches!(
            provider.provide(&raw).await,
            Err(TokenError::Blacklisted { token_id: 42 })
        ));
    }

    #[tokio::test]
    async fn blacklist_error_message_hides_the_id() {
        let provider = provider(Arc::new(StaticRevocationChecker::new([4242])));

        let err = provider.provide(&token(4242)).await.expect_err("revoked");
        assert!(!err.to_string().contains("4242"));
    }

    #[tokio::test]
    async fn decoding_failure_is_propagated_unchanged() {
        let provider = provider(Arc::new(StaticRevocationChecker::new([])));

        assert!(matches!(
            provider.provide("abc.def.ghi").await,
            Err(TokenError::Decoding(TokenDecodingError::Malformed { .. }))
        ));
    }

    #[tokio::test]
    async fn default_checker_rejects_every_token() {
        let provider = JwtTokenDataProvider::new(Arc::new(test_validator()));

        assert!(matches!(
            provider.provide(&token(1)).await,
            Err(TokenError::Blacklisted { token_id: 1 })
        ));
        assert!(provider.ensure_revocation_wired().is_err());
    }

    #[test]
    fn real_checker_passes_startup_guard() {
        let provider = provider(Arc::new(StaticRevocationChecker::new([])));
        assert!(provider.ensure_revocation_wired().is_ok());
    }

    #[tokio::test]
    async fn backend_failure_is_kept_distinct() {
        let provider = provider(Arc::new(BrokenChecker));

        assert!(matches!(
            provider.provide(&token(1)).await,
            Err(TokenError::RevocationUnavailable(_))
        ));
    }
}
