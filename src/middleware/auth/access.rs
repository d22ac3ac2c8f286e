//! Runs the authentication gate on every request and hands the principal to handlers.
//!
//! On success an `AuthCtx` is inserted into request extensions (read by `AuthCtxExtractor`).
//! On failure the client only sees the outward class (401 with a challenge, or 503); the
//! cause, token id and token fingerprint go to the log.

use std::error::Error as _;

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{Method, Request},
    middleware::{self, Next},
    response::Response,
};

use crate::api::v1::extractors::AuthCtx;
use crate::error::AppError;
use crate::services::auth::{AuthFailure, RequestView};
use crate::services::token::TokenError;
use crate::state::AppState;

/// 例：
/// ```ignore
/// let router = middleware::auth::access::apply(router, state.clone());
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // axum 0.8 の from_fn は State extractor を受け取れないため、`from_fn_with_state` で明示的に state を渡す
    router.layer(middleware::from_fn_with_state(state, access_middleware))
}

async fn access_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    // The body isn't Sync; only the head is borrowed across the await.
    let (mut parts, body) = req.into_parts();

    let result = {
        let view = RequestView::new(&parts.method, parts.uri.path(), &parts.headers);
        state.gate.attempt_authenticate(&view).await
    };

    let principal = match result {
        Ok(principal) => principal,
        Err(failure) => {
            log_failure(&failure, &parts.method, parts.uri.path());
            return Err(AppError::from_auth_failure(&failure, state.gate.scheme()));
        }
    };

    tracing::debug!(
        principal = principal.name(),
        anonymous = principal.is_anonymous(),
        "request authenticated"
    );
    parts.extensions.insert(AuthCtx::new(principal));

    Ok(next.run(Request::from_parts(parts, body)).await)
}

fn log_failure(failure: &AuthFailure, method: &Method, path: &str) {
    match failure {
        AuthFailure::Authentication(failed) => {
            let token_id = match failed.cause() {
                TokenError::Blacklisted { token_id } => Some(*token_id),
                _ => None,
            };
            tracing::warn!(
                %method,
                path,
                cause = %error_chain(failed.cause()),
                token_id,
                fingerprint = failed.fingerprint(),
                "token authentication failed"
            );
        }
        other => {
            tracing::warn!(%method, path, reason = %other, "authentication failed");
        }
    }
}

// "outer: inner: innermost"
fn error_chain(err: &TokenError) -> String {
    let mut chain = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        chain.push_str(": ");
        chain.push_str(&cause.to_string());
        source = cause.source();
    }
    chain
}
