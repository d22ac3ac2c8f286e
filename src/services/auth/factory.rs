/// Factory: build the authentication services from application `Config`.
use std::sync::Arc;

use crate::config::{AuthConfig, RevocationBackend};
use crate::services::auth::{AuthenticationGate, TokenAuthenticator};
use crate::services::revocation::{
    RevocationChecker, RevocationError, StaticRevocationChecker, ValkeyRevocationChecker,
};
use crate::services::token::{
    JwtTokenDataProvider, KeyError, RevocationNotWired, RoleGrantResolver, TokenCodec,
    TokenValidator,
};

#[derive(Debug, thiserror::Error)]
pub enum AuthSetupError {
    #[error("invalid key material")]
    Key(#[from] KeyError),
    #[error("revocation backend unavailable")]
    Revocation(#[from] RevocationError),
    #[error(transparent)]
    RevocationNotWired(#[from] RevocationNotWired),
}

/// `None` when no backend is configured.
pub async fn build_revocation_checker(
    backend: &RevocationBackend,
) -> Result<Option<Arc<dyn RevocationChecker>>, RevocationError> {
    let checker: Arc<dyn RevocationChecker> = match backend {
        RevocationBackend::Unset => return Ok(None),
        RevocationBackend::Static { revoked_ids } => {
            Arc::new(StaticRevocationChecker::new(revoked_ids.iter().copied()))
        }
        RevocationBackend::Valkey { url, key_prefix } => {
            Arc::new(ValkeyRevocationChecker::connect(url, key_prefix.clone()).await?)
        }
    };
    Ok(Some(checker))
}

/// Fails at startup instead of rejecting every request when revocation isn't wired.
pub fn build_gate(
    auth: &AuthConfig,
    revocation: Option<Arc<dyn RevocationChecker>>,
) -> Result<AuthenticationGate, AuthSetupError> {
    let validator = TokenValidator::new(
        &auth.public_key,
        auth.algorithm,
        auth.clock_leeway_seconds,
        Arc::new(RoleGrantResolver),
    )?;

    let mut provider = JwtTokenDataProvider::new(Arc::new(validator));
    if let Some(checker) = revocation {
        provider = provider.with_revocation_checker(checker);
    }
    provider.ensure_revocation_wired()?;

    tracing::info!(
        algorithm = ?auth.algorithm,
        revocation = provider.revocation_backend(),
        "token authentication ready"
    );

    let authenticator = TokenAuthenticator::new(Arc::new(provider));
    Ok(
        AuthenticationGate::new(auth.header_name.clone(), auth.scheme.clone(), authenticator)
            .with_optional_routes(auth.optional_routes.iter().cloned()),
    )
}

/// `None` when no signing key is configured (issuance disabled).
pub fn build_codec(auth: &AuthConfig) -> Result<Option<TokenCodec>, KeyError> {
    auth.private_key
        .as_deref()
        .map(|key| TokenCodec::new(key, auth.algorithm, auth.token_lifetime_seconds))
        .transpose()
}
