use std::collections::HashSet;

use async_trait::async_trait;

use crate::services::cache::CacheError;

/// Revocation check result:
/// - `Ok(true)`: the token id is blacklisted
/// - `Ok(false)`: not blacklisted
/// - `Err(_)`: the store could not answer (callers fail the request)
#[async_trait]
pub trait RevocationChecker: Send + Sync {
    // Backend name for logs.
    fn backend_name(&self) -> &'static str;

    async fn is_blacklisted(&self, token_id: i64) -> Result<bool, RevocationError>;

    /// True only for the placeholder used when no real store was wired.
    fn is_fail_closed_default(&self) -> bool {
        false
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RevocationError {
    #[error(transparent)]
    Cache(#[from] CacheError),
}

/// Placeholder checker: every token is blacklisted.
///
/// Used when nothing else was configured so that a missing revocation store never grants
/// access. Startup rejects it (see `JwtTokenDataProvider::ensure_revocation_wired`).
#[derive(Debug, Clone, Copy, Default)]
pub struct FailClosedRevocationChecker;

#[async_trait]
impl RevocationChecker for FailClosedRevocationChecker {
    fn backend_name(&self) -> &'static str {
        "fail-closed"
    }

    async fn is_blacklisted(&self, _token_id: i64) -> Result<bool, RevocationError> {
        Ok(true)
    }

    fn is_fail_closed_default(&self) -> bool {
        true
    }
}

/// Fixed, in-memory set of revoked token ids.
#[derive(Debug, Clone, Default)]
pub struct StaticRevocationChecker {
    revoked: HashSet<i64>,
}

impl StaticRevocationChecker {
    pub fn new(revoked: impl IntoIterator<Item = i64>) -> Self {
        Self {
            revoked: revoked.into_iter().collect(),
        }
    }
}

#[async_trait]
impl RevocationChecker for StaticRevocationChecker {
    fn backend_name(&self) -> &'static str {
        "static"
    }

    async fn is_blacklisted(&self, token_id: i64) -> Result<bool, RevocationError> {
        Ok(self.revoked.contains(&token_id))
    }
}
