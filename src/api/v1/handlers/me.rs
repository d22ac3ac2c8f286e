/*
 * Responsibility
 * - GET /api/v1/me: 現在の principal (名前・権限・匿名か) を返す
 */
use axum::Json;

use crate::api::v1::{dto::me::MeResponse, extractors::AuthCtxExtractor};

pub async fn me(AuthCtxExtractor(ctx): AuthCtxExtractor) -> Json<MeResponse> {
    Json(MeResponse::from(ctx.principal()))
}
