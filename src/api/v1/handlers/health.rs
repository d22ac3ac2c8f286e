/*
 * Responsibility
 * - GET /health (疎通用)
 * - 既定では認証任意のルート (AUTH_OPTIONAL_ROUTES)
 */
use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status": "ok"})))
}
