/*
 * Responsibility
 * - POST /api/v1/tokens: 管理者 (role-admin) が任意の identity 向けにトークンを発行する
 * - 秘密鍵が未設定 (発行無効) の場合は 404
 */
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};

use crate::api::v1::{
    dto::tokens::{TokenRequest, TokenResponse},
    extractors::AuthCtxExtractor,
};
use crate::error::AppError;
use crate::services::token::{RoleGrant, TokenData};
use crate::state::AppState;

pub async fn issue_token(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    payload: Result<Json<TokenRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TokenResponse>), AppError> {
    let codec = state
        .codec
        .as_ref()
        .ok_or(AppError::not_found("token issuer"))?;

    if !ctx.has_authority(RoleGrant::RoleAdmin.as_str()) {
        return Err(AppError::Forbidden);
    }

    // Body problems are reported only once the caller is allowed to issue at all.
    let Json(req) =
        payload.map_err(|rejection| AppError::bad_request("INVALID_REQUEST", rejection.body_text()))?;

    req.validate()
        .map_err(|message| AppError::bad_request("INVALID_REQUEST", message))?;
    let grants = req
        .resolve_grants()
        .map_err(|message| AppError::bad_request("INVALID_GRANT", message))?;

    let data = TokenData::new(req.id, req.username.trim(), grants);
    let token = codec.encode(&data)?;

    tracing::info!(
        token_id = data.id(),
        issued_by = ctx.principal().name(),
        "token issued"
    );

    Ok((
        StatusCode::CREATED,
        Json(TokenResponse {
            token,
            token_type: state.gate.scheme().to_string(),
            expires_in: codec.lifetime_seconds(),
        }),
    ))
}
