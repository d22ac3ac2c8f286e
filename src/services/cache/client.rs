//! Key-value store seam for revocation lookups.
use async_trait::async_trait;
use thiserror::Error;

pub type CacheResult<T> = Result<T, CacheError>;

/// Store failures. Independent from `AppError`: revocation turns them into
/// "service unavailable", never into "not revoked".
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache connection error: {0}")]
    BackendConnection(String),
    #[error("cache command error: {0}")]
    BackendCommand(String),
}

/// Read-only view of a key-value store. Clones must share the underlying connection.
#[async_trait]
pub trait CacheClient: Clone + Send + Sync + 'static {
    /// Short backend name for logs.
    fn backend_name(&self) -> &'static str;

    async fn exists(&self, key: &str) -> CacheResult<bool>;
}
