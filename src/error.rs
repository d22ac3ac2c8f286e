/*
 * Responsibility
 * - アプリ共通の AppError 定義
 * - IntoResponse 実装 (HTTP status / JSON error body / WWW-Authenticate)
 * - 認証失敗・トークン発行エラーを統一的に変換
 */
use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::services::auth::{AuthFailure, FailureClass};
use crate::services::token::TokenEncodingError;

const UNAUTHENTICATED_MESSAGE: &str = "authentication required";

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{code}: {message}")]
    BadRequest { code: &'static str, message: String },
    // Every authentication failure looks the same to the client.
    #[error("unauthenticated")]
    Unauthenticated { scheme: String },
    #[error("forbidden")]
    Forbidden,
    #[error("not found: {resource}")]
    NotFound { resource: &'static str },
    #[error("service unavailable")]
    ServiceUnavailable,
    #[error("internal server error")]
    Internal,
}

impl AppError {
    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::BadRequest {
            code,
            message: message.into(),
        }
    }

    pub fn unauthenticated(scheme: impl Into<String>) -> Self {
        Self::Unauthenticated {
            scheme: scheme.into(),
        }
    }

    pub fn not_found(resource: &'static str) -> Self {
        Self::NotFound { resource }
    }

    /// Outward form of a gate failure. Only the class leaks, never the cause.
    pub fn from_auth_failure(failure: &AuthFailure, scheme: &str) -> Self {
        match failure.class() {
            FailureClass::Unauthenticated => Self::unauthenticated(scheme),
            FailureClass::ServiceUnavailable => Self::ServiceUnavailable,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut challenge = None;

        let (status, code, message) = match self {
            AppError::BadRequest { code, message } => (StatusCode::BAD_REQUEST, code, message),
            AppError::Unauthenticated { scheme } => {
                challenge = HeaderValue::from_str(&scheme).ok();
                (
                    StatusCode::UNAUTHORIZED,
                    "UNAUTHENTICATED",
                    UNAUTHENTICATED_MESSAGE.into(),
                )
            }
            AppError::Forbidden => (StatusCode::FORBIDDEN, "FORBIDDEN", "forbidden".into()),
            AppError::NotFound { resource } => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("{resource} not found."),
            ),
            AppError::ServiceUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "SERVICE_UNAVAILABLE",
                "service temporarily unavailable".into(),
            ),
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_SERVER_ERROR",
                "internal server error".into(),
            ),
        };

        let body = ErrorResponse {
            error: ErrorBody { code, message },
        };

        let mut response = (status, Json(body)).into_response();
        if let Some(value) = challenge {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, value);
        }
        response
    }
}

impl From<TokenEncodingError> for AppError {
    fn from(e: TokenEncodingError) -> Self {
        tracing::error!(error = %e, "token issuance failed");
        AppError::Internal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn unauthenticated_carries_challenge_and_uniform_body() {
        let response = AppError::unauthenticated("Bearer").into_response();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).map(|v| v.as_bytes()),
            Some(&b"Bearer"[..])
        );
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "UNAUTHENTICATED");
        assert_eq!(body["error"]["message"], UNAUTHENTICATED_MESSAGE);
    }

    #[tokio::test]
    async fn auth_failures_map_by_class() {
        let error = AppError::from_auth_failure(&AuthFailure::UnsupportedScheme, "Token");
        assert!(matches!(&error, AppError::Unauthenticated { scheme } if scheme == "Token"));

        let error = AppError::from_auth_failure(&AuthFailure::MissingCredentials, "Bearer");
        assert_eq!(error.into_response().status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn other_statuses() {
        let cases = [
            (AppError::Forbidden, StatusCode::FORBIDDEN, "FORBIDDEN"),
            (AppError::not_found("token issuer"), StatusCode::NOT_FOUND, "NOT_FOUND"),
            (
                AppError::ServiceUnavailable,
                StatusCode::SERVICE_UNAVAILABLE,
                "SERVICE_UNAVAILABLE",
            ),
            (
                AppError::bad_request("INVALID_REQUEST", "username is required"),
                StatusCode::BAD_REQUEST,
                "INVALID_REQUEST",
            ),
            (AppError::Internal, StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_SERVER_ERROR"),
        ];

        for (error, status, code) in cases {
            let response = error.into_response();
            assert_eq!(response.status(), status);
            assert!(response.headers().get(header::WWW_AUTHENTICATE).is_none());
            assert_eq!(body_json(response).await["error"]["code"], code);
        }
    }
}
