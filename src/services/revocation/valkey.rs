use std::sync::Arc;

use async_trait::async_trait;

use crate::services::{
    cache::{CacheClient, ValkeyClient},
    revocation::checker::{RevocationChecker, RevocationError},
};

/// Valkey-backed revocation list (Redis protocol).
///
/// A token id is blacklisted when `<prefix>:<id>` exists. Whoever revokes a token sets
/// that key (typically with a TTL equal to the token's remaining lifetime); this service
/// only reads. Backend errors are returned as `Err`, never as "not blacklisted".
#[derive(Clone)]
pub struct ValkeyRevocationChecker<C: CacheClient> {
    cache: Arc<C>,
    prefix: String,
}

impl ValkeyRevocationChecker<ValkeyClient> {
    pub async fn connect(redis_url: &str, prefix: impl Into<String>) -> Result<Self, RevocationError> {
        let client = ValkeyClient::connect(redis_url).await?;

        Ok(Self {
            cache: Arc::new(client),
            prefix: prefix.into(),
        })
    }
}

impl<C: CacheClient> ValkeyRevocationChecker<C> {
    pub fn new_with_cache(cache: Arc<C>, prefix: impl Into<String>) -> Self {
        Self {
            cache,
            prefix: prefix.into(),
        }
    }

    pub fn key(&self, token_id: i64) -> String {
        format!("{}:{}", self.prefix, token_id)
    }
}

#[async_trait]
impl<C: CacheClient> RevocationChecker for ValkeyRevocationChecker<C> {
    fn backend_name(&self) -> &'static str {
        self.cache.backend_name()
    }

    async fn is_blacklisted(&self, token_id: i64) -> Result<bool, RevocationError> {
        let key = self.key(token_id);
        Ok(self.cache.exists(&key).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::cache::{CacheError, client::CacheResult};
    use std::collections::HashSet;

    #[derive(Clone, Default)]
    struct MemoryCache {
        keys: HashSet<String>,
        broken: bool,
    }

    #[async_trait]
    impl CacheClient for MemoryCache {
        fn backend_name(&self) -> &'static str {
            "memory"
        }

        async fn exists(&self, key: &str) -> CacheResult<bool> {
            if self.broken {
                return Err(CacheError::BackendConnection("connection refused".to_string()));
            }
            Ok(self.keys.contains(key))
        }
    }

    fn checker(keys: &[&str], broken: bool) -> ValkeyRevocationChecker<MemoryCache> {
        let cache = MemoryCache {
            keys: keys.iter().map(|k| k.to_string()).collect(),
            broken,
        };
        ValkeyRevocationChecker::new_with_cache(Arc::new(cache), "auth:revoked")
    }

    #[test]
    fn keys_are_prefixed() {
        assert_eq!(checker(&[], false).key(42), "auth:revoked:42");
    }

    #[tokio::test]
    async fn existing_key_means_blacklisted() {
        let checker = checker(&["auth:revoked:42"], false);

        assert!(checker.is_blacklisted(42).await.expect("backend up"));
        assert!(!checker.is_blacklisted(43).await.expect("backend up"));
        assert_eq!(checker.backend_name(), "memory");
    }

    #[tokio::test]
    async fn backend_failure_is_an_error_not_a_pass() {
        let checker = checker(&[], true);

        assert!(matches!(
            checker.is_blacklisted(42).await,
            Err(RevocationError::Cache(CacheError::BackendConnection(_)))
        ));
    }
}
