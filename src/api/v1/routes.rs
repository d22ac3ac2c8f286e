/*
 * Responsibility
 * - v1 の URL 構造を定義 (/me, /tokens)
 * - 認証 gate は app.rs で Router 全体に掛ける
 */
use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use crate::api::v1::handlers::{me::me, tokens::issue_token};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(me))
        .route("/tokens", post(issue_token))
}
