use async_trait::async_trait;
use redis::{AsyncCommands, RedisError, aio::ConnectionManager};

use crate::services::cache::client::{CacheClient, CacheError, CacheResult};

/// Valkey (Redis protocol) client holding a self-reconnecting connection.
#[derive(Clone)]
pub struct ValkeyClient {
    manager: ConnectionManager,
}

impl std::fmt::Debug for ValkeyClient {
    // The URL may carry credentials, so it is never kept or printed.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValkeyClient").finish_non_exhaustive()
    }
}

impl ValkeyClient {
    /// Connect to e.g. `redis://localhost:6379` and check the server answers `PING`,
    /// so a wrong URL fails at startup instead of on the first request.
    pub async fn connect(url: &str) -> CacheResult<Self> {
        let client = redis::Client::open(url).map_err(connection_error)?;
        let mut manager = client
            .get_connection_manager()
            .await
            .map_err(connection_error)?;

        let _: String = redis::cmd("PING")
            .query_async(&mut manager)
            .await
            .map_err(connection_error)?;

        Ok(Self { manager })
    }
}

#[async_trait]
impl CacheClient for ValkeyClient {
    fn backend_name(&self) -> &'static str {
        "valkey"
    }

    async fn exists(&self, key: &str) -> CacheResult<bool> {
        let mut conn = self.manager.clone();
        let found: bool = conn.exists(key).await.map_err(command_error)?;
        Ok(found)
    }
}

fn connection_error(e: RedisError) -> CacheError {
    CacheError::BackendConnection(e.to_string())
}

fn command_error(e: RedisError) -> CacheError {
    CacheError::BackendCommand(e.to_string())
}
