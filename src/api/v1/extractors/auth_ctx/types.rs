/*
 * Responsibility
 * - Handler から見える「認証済みコンテキスト」の型
 * - middleware (gate) が request extensions に格納し、handler はこの型だけを受け取る
 */

use crate::services::auth::Principal;

/// 認証 gate を通過したリクエストのコンテキスト
///
/// 認証任意のルートで資格情報がない場合は匿名 principal になる。
#[derive(Debug, Clone)]
pub struct AuthCtx {
    principal: Principal,
}

impl AuthCtx {
    pub fn new(principal: Principal) -> Self {
        Self { principal }
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    pub fn has_authority(&self, authority: &str) -> bool {
        self.principal.has_authority(authority)
    }
}
