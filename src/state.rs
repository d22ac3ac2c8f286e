/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - gate: リクエスト毎の認証, codec: トークン発行 (秘密鍵がある場合のみ)
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 */
use std::sync::Arc;

use crate::services::{auth::AuthenticationGate, token::TokenCodec};

#[derive(Clone, Debug)]
pub struct AppState {
    pub gate: Arc<AuthenticationGate>,
    pub codec: Option<Arc<TokenCodec>>,
}

impl AppState {
    pub fn new(gate: Arc<AuthenticationGate>, codec: Option<Arc<TokenCodec>>) -> Self {
        Self { gate, codec }
    }
}
