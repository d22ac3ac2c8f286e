/*
 * Responsibility
 * - 環境変数の読み込み (鍵、アルゴリズム、ヘッダ名、失効チェックのバックエンドなど)
 * - 設定値のバリデーション (不足・不正なら起動失敗)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use axum::http::HeaderName;
use jsonwebtoken::Algorithm;

use crate::services::auth::RouteMatcher;
use crate::services::token::keys;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_ALGORITHM: Algorithm = Algorithm::RS512;
pub const DEFAULT_TOKEN_LIFETIME_SECONDS: u64 = 3600;
pub const DEFAULT_HEADER_NAME: &str = "authorization";
pub const DEFAULT_SCHEME: &str = "Bearer";
pub const DEFAULT_OPTIONAL_ROUTES: &str = "GET /health";
pub const DEFAULT_REVOCATION_KEY_PREFIX: &str = "auth:revoked";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(raw: Option<String>) -> Self {
        match raw
            .unwrap_or_else(|| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing configuration: {0}")]
    Missing(&'static str),
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Token and credential-header settings.
#[derive(Clone)]
pub struct AuthConfig {
    pub public_key: String,
    // Issuance is enabled only when a signing key is configured.
    pub private_key: Option<String>,
    pub algorithm: Algorithm,
    pub token_lifetime_seconds: u64,
    pub clock_leeway_seconds: u64,
    pub header_name: HeaderName,
    pub scheme: String,
    pub optional_routes: Vec<RouteMatcher>,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("issuance_enabled", &self.private_key.is_some())
            .field("algorithm", &self.algorithm)
            .field("token_lifetime_seconds", &self.token_lifetime_seconds)
            .field("clock_leeway_seconds", &self.clock_leeway_seconds)
            .field("header_name", &self.header_name)
            .field("scheme", &self.scheme)
            .field("optional_routes", &self.optional_routes)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevocationBackend {
    /// Nothing configured. Startup refuses this.
    Unset,
    Static { revoked_ids: Vec<i64> },
    Valkey { url: String, key_prefix: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,
    pub auth: AuthConfig,
    pub revocation: RevocationBackend,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; blank values count as unset.
    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port: u16 = parse_or(var("PORT"), "PORT", DEFAULT_PORT)?;
        let addr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::parse(var("APP_ENV"));

        let auth = AuthConfig {
            public_key: var("AUTH_PUBLIC_KEY").ok_or(ConfigError::Missing("AUTH_PUBLIC_KEY"))?,
            private_key: var("AUTH_PRIVATE_KEY"),
            algorithm: parse_algorithm(var("AUTH_TOKEN_ALGORITHM"))?,
            token_lifetime_seconds: parse_lifetime(var("AUTH_TOKEN_LIFETIME_SECONDS"))?,
            clock_leeway_seconds: parse_or(
                var("AUTH_CLOCK_LEEWAY_SECONDS"),
                "AUTH_CLOCK_LEEWAY_SECONDS",
                0,
            )?,
            header_name: parse_header_name(var("AUTH_HEADER_NAME"))?,
            scheme: parse_scheme(var("AUTH_SCHEME"))?,
            optional_routes: RouteMatcher::parse_list(
                // An explicitly blank value disables optional routes entirely.
                &lookup("AUTH_OPTIONAL_ROUTES").unwrap_or_else(|| DEFAULT_OPTIONAL_ROUTES.to_string()),
            )
            .map_err(|_| ConfigError::Invalid("AUTH_OPTIONAL_ROUTES"))?,
        };

        let revocation = match var("REVOCATION_BACKEND")
            .map(|v| v.trim().to_ascii_lowercase())
            .as_deref()
        {
            None => RevocationBackend::Unset,
            Some("static") => RevocationBackend::Static {
                revoked_ids: parse_ids(var("REVOCATION_STATIC_IDS"))?,
            },
            Some("valkey") => RevocationBackend::Valkey {
                url: var("REVOCATION_VALKEY_URL")
                    .ok_or(ConfigError::Missing("REVOCATION_VALKEY_URL"))?,
                key_prefix: var("REVOCATION_KEY_PREFIX")
                    .unwrap_or_else(|| DEFAULT_REVOCATION_KEY_PREFIX.to_string()),
            },
            Some(_) => return Err(ConfigError::Invalid("REVOCATION_BACKEND")),
        };

        Ok(Self {
            addr,
            app_env,
            auth,
            revocation,
        })
    }
}

fn parse_or<T: FromStr>(raw: Option<String>, key: &'static str, default: T) -> Result<T, ConfigError> {
    match raw {
        Some(v) => v.trim().parse().map_err(|_| ConfigError::Invalid(key)),
        None => Ok(default),
    }
}

fn parse_algorithm(raw: Option<String>) -> Result<Algorithm, ConfigError> {
    let Some(raw) = raw else {
        return Ok(DEFAULT_ALGORITHM);
    };
    let algorithm = Algorithm::from_str(raw.trim())
        .map_err(|_| ConfigError::Invalid("AUTH_TOKEN_ALGORITHM"))?;

    if !keys::is_supported(algorithm) {
        return Err(ConfigError::Invalid("AUTH_TOKEN_ALGORITHM"));
    }
    Ok(algorithm)
}

fn parse_lifetime(raw: Option<String>) -> Result<u64, ConfigError> {
    let key = "AUTH_TOKEN_LIFETIME_SECONDS";
    match parse_or(raw, key, DEFAULT_TOKEN_LIFETIME_SECONDS)? {
        0 => Err(ConfigError::Invalid(key)),
        seconds => Ok(seconds),
    }
}

fn parse_header_name(raw: Option<String>) -> Result<HeaderName, ConfigError> {
    let raw = raw.unwrap_or_else(|| DEFAULT_HEADER_NAME.to_string());
    HeaderName::from_str(raw.trim()).map_err(|_| ConfigError::Invalid("AUTH_HEADER_NAME"))
}

fn parse_scheme(raw: Option<String>) -> Result<String, ConfigError> {
    let scheme = raw.unwrap_or_else(|| DEFAULT_SCHEME.to_string());
    let scheme = scheme.trim();

    // The scheme is the first whitespace-separated word of the header.
    if scheme.split_whitespace().count() != 1 {
        return Err(ConfigError::Invalid("AUTH_SCHEME"));
    }
    Ok(scheme.to_string())
}

fn parse_ids(raw: Option<String>) -> Result<Vec<i64>, ConfigError> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i64>()
                .map_err(|_| ConfigError::Invalid("REVOCATION_STATIC_IDS"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Method;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let mut vars: HashMap<String, String> = HashMap::new();
        vars.insert("AUTH_PUBLIC_KEY".into(), "public-key".into());
        for (k, v) in pairs {
            vars.insert(k.to_string(), v.to_string());
        }
        Config::from_vars(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = config(&[]).expect("config");

        assert_eq!(config.addr.port(), 3000);
        assert_eq!(config.app_env, AppEnv::Development);
        assert_eq!(config.auth.algorithm, Algorithm::RS512);
        assert_eq!(config.auth.token_lifetime_seconds, 3600);
        assert_eq!(config.auth.clock_leeway_seconds, 0);
        assert_eq!(config.auth.header_name, axum::http::header::AUTHORIZATION);
        assert_eq!(config.auth.scheme, "Bearer");
        assert!(config.auth.private_key.is_none());
        assert_eq!(config.auth.optional_routes.len(), 1);
        assert!(config.auth.optional_routes[0].matches(&Method::GET, "/health"));
        assert_eq!(config.revocation, RevocationBackend::Unset);
    }

    #[test]
    fn public_key_is_required() {
        let err = Config::from_vars(|_| None).expect_err("missing key");
        assert_eq!(err, ConfigError::Missing("AUTH_PUBLIC_KEY"));

        let err = Config::from_vars(|key| (key == "AUTH_PUBLIC_KEY").then(|| "  ".to_string()))
            .expect_err("blank key");
        assert_eq!(err, ConfigError::Missing("AUTH_PUBLIC_KEY"));
    }

    #[test]
    fn overrides() {
        let config = config(&[
            ("PORT", "8080"),
            ("APP_ENV", "PROD"),
            ("AUTH_PRIVATE_KEY", "private-key"),
            ("AUTH_TOKEN_ALGORITHM", "EdDSA"),
            ("AUTH_TOKEN_LIFETIME_SECONDS", "60"),
            ("AUTH_CLOCK_LEEWAY_SECONDS", "5"),
            ("AUTH_HEADER_NAME", "X-Api-Token"),
            ("AUTH_SCHEME", "Token"),
            ("AUTH_OPTIONAL_ROUTES", "GET /health, /public/**"),
        ])
        .expect("config");

        assert_eq!(config.addr.port(), 8080);
        assert!(config.app_env.is_production());
        assert_eq!(config.auth.private_key.as_deref(), Some("private-key"));
        assert_eq!(config.auth.algorithm, Algorithm::EdDSA);
        assert_eq!(config.auth.token_lifetime_seconds, 60);
        assert_eq!(config.auth.clock_leeway_seconds, 5);
        assert_eq!(config.auth.header_name.as_str(), "x-api-token");
        assert_eq!(config.auth.scheme, "Token");
        assert_eq!(config.auth.optional_routes.len(), 2);
    }

    #[test]
    fn invalid_values_are_reported_by_key() {
        let cases = [
            ("PORT", "eighty", "PORT"),
            ("AUTH_TOKEN_ALGORITHM", "HS256", "AUTH_TOKEN_ALGORITHM"),
            ("AUTH_TOKEN_ALGORITHM", "RS999", "AUTH_TOKEN_ALGORITHM"),
            ("AUTH_TOKEN_LIFETIME_SECONDS", "0", "AUTH_TOKEN_LIFETIME_SECONDS"),
            ("AUTH_TOKEN_LIFETIME_SECONDS", "-5", "AUTH_TOKEN_LIFETIME_SECONDS"),
            ("AUTH_CLOCK_LEEWAY_SECONDS", "soon", "AUTH_CLOCK_LEEWAY_SECONDS"),
            ("AUTH_HEADER_NAME", "bad header", "AUTH_HEADER_NAME"),
            ("AUTH_SCHEME", "Two Words", "AUTH_SCHEME"),
            ("AUTH_OPTIONAL_ROUTES", "health", "AUTH_OPTIONAL_ROUTES"),
            ("REVOCATION_BACKEND", "memcached", "REVOCATION_BACKEND"),
        ];

        for (key, value, reported) in cases {
            let err = config(&[(key, value)]).expect_err(key);
            assert_eq!(err, ConfigError::Invalid(reported), "{key}={value}");
        }
    }

    #[test]
    fn blank_optional_routes_disable_them() {
        let config = config(&[("AUTH_OPTIONAL_ROUTES", "")]).expect("config");
        assert!(config.auth.optional_routes.is_empty());
    }

    #[test]
    fn static_revocation_backend() {
        let cfg = config(&[
            ("REVOCATION_BACKEND", "Static"),
            ("REVOCATION_STATIC_IDS", "1, 42,-7"),
        ])
        .expect("config");

        assert_eq!(
            cfg.revocation,
            RevocationBackend::Static {
                revoked_ids: vec![1, 42, -7]
            }
        );

        let err = config(&[
            ("REVOCATION_BACKEND", "static"),
            ("REVOCATION_STATIC_IDS", "1,two"),
        ])
        .expect_err("bad id");
        assert_eq!(err, ConfigError::Invalid("REVOCATION_STATIC_IDS"));
    }

    #[test]
    fn valkey_revocation_backend() {
        let err = config(&[("REVOCATION_BACKEND", "valkey")]).expect_err("url required");
        assert_eq!(err, ConfigError::Missing("REVOCATION_VALKEY_URL"));

        let config = config(&[
            ("REVOCATION_BACKEND", "valkey"),
            ("REVOCATION_VALKEY_URL", "redis://localhost:6379"),
        ])
        .expect("config");

        assert_eq!(
            config.revocation,
            RevocationBackend::Valkey {
                url: "redis://localhost:6379".to_string(),
                key_prefix: "auth:revoked".to_string(),
            }
        );
    }

    #[test]
    fn debug_hides_keys() {
        let config = config(&[("AUTH_PRIVATE_KEY", "super-secret")]).expect("config");
        let debug = format!("{:?}", config);

        assert!(!debug.contains("super-secret"));
        assert!(!debug.contains("public-key"));
        assert!(debug.contains("issuance_enabled: true"));
    }
}
