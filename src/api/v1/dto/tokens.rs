/*
 * Responsibility
 * - POST /api/v1/tokens の request/response DTO
 * - validate() で形式チェック、grant 名は RoleGrant として解決する
 */
use serde::{Deserialize, Serialize};

use crate::services::token::{Grant, RoleGrant};

const MAX_USERNAME_LEN: usize = 256;

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub grants: Vec<String>,
}

impl TokenRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.username.trim().is_empty() {
            return Err("username is required");
        }
        if self.username.len() > MAX_USERNAME_LEN {
            return Err("username must be <= 256 bytes");
        }
        Ok(())
    }

    /// Unlike decoding, issuing refuses names it does not know.
    pub fn resolve_grants(&self) -> Result<Vec<Grant>, String> {
        self.grants
            .iter()
            .map(|raw| {
                raw.parse::<RoleGrant>()
                    .map(Grant::from)
                    .map_err(|_| format!("unknown grant: {raw}"))
            })
            .collect()
    }
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
    pub token_type: String,
    pub expires_in: u64,
}
