//! Per-request authentication gate.
//!
//! ```text
//!                      no header, optional route
//!   NoCredentials ------------------------------------> Authenticated(anonymous)
//!        |  no header, mandatory route
//!        +------------------------------------------->  Failed(MissingCredentials)
//!
//!   CredentialsPresent --bad scheme--------------------> Failed(UnsupportedScheme)
//!        |--no token value---------------------------->  Failed(MissingTokenValue)
//!        |--authenticator rejects--------------------->  Failed(Authentication)
//!        +--authenticator accepts--------------------->  Authenticated(principal)
//! ```
//!
//! `Authenticated` and `Failed` are terminal. Header and scheme problems are decided
//! before any token is decoded.

use axum::http::{HeaderMap, HeaderName, Method};

use super::authenticator::{AuthenticationFailed, TokenAuthenticator};
use super::principal::Principal;
use super::route_matcher::RouteMatcher;
use crate::services::token::TokenError;

/// Framework-independent view of the parts of a request the gate looks at.
#[derive(Debug, Clone, Copy)]
pub struct RequestView<'a> {
    pub method: &'a Method,
    pub path: &'a str,
    pub headers: &'a HeaderMap,
}

impl<'a> RequestView<'a> {
    pub fn new(method: &'a Method, path: &'a str, headers: &'a HeaderMap) -> Self {
        Self {
            method,
            path,
            headers,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthFailure {
    #[error("authentication is not optional for this route")]
    MissingCredentials,
    #[error("unsupported authentication scheme")]
    UnsupportedScheme,
    #[error("missing token value")]
    MissingTokenValue,
    #[error(transparent)]
    Authentication(#[from] AuthenticationFailed),
}

/// What the boundary may tell the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    Unauthenticated,
    ServiceUnavailable,
}

impl AuthFailure {
    pub fn class(&self) -> FailureClass {
        match self {
            AuthFailure::Authentication(failed)
                if matches!(failed.cause(), TokenError::RevocationUnavailable(_)) =>
            {
                FailureClass::ServiceUnavailable
            }
            _ => FailureClass::Unauthenticated,
        }
    }
}

#[derive(Debug)]
enum GateState<'r> {
    NoCredentials,
    CredentialsPresent(&'r str),
    Authenticated(Principal),
    Failed(AuthFailure),
}

impl GateState<'_> {
    fn name(&self) -> &'static str {
        match self {
            GateState::NoCredentials => "no_credentials",
            GateState::CredentialsPresent(_) => "credentials_present",
            GateState::Authenticated(_) => "authenticated",
            GateState::Failed(_) => "failed",
        }
    }
}

/// Authenticates each request from a `<scheme> <token>` credential header.
#[derive(Clone)]
pub struct AuthenticationGate {
    header_name: HeaderName,
    scheme: String,
    optional_routes: Vec<RouteMatcher>,
    authenticator: TokenAuthenticator,
}

impl std::fmt::Debug for AuthenticationGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticationGate")
            .field("header_name", &self.header_name)
            .field("scheme", &self.scheme)
            .field("optional_routes", &self.optional_routes)
            .finish()
    }
}

impl AuthenticationGate {
    pub fn new(
        header_name: HeaderName,
        scheme: impl Into<String>,
        authenticator: TokenAuthenticator,
    ) -> Self {
        Self {
            header_name,
            scheme: scheme.into(),
            optional_routes: Vec::new(),
            authenticator,
        }
    }

    pub fn with_optional_routes(mut self, routes: impl IntoIterator<Item = RouteMatcher>) -> Self {
        self.optional_routes.extend(routes);
        self
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn header_name(&self) -> &HeaderName {
        &self.header_name
    }

    /// Run the gate for one request. No retries: the result is final for this request.
    pub async fn attempt_authenticate(
        &self,
        request: &RequestView<'_>,
    ) -> Result<Principal, AuthFailure> {
        let mut state = self.read_credentials(request);

        loop {
            tracing::trace!(state = state.name(), "authentication gate");
            state = match state {
                GateState::NoCredentials => self.on_missing_credentials(request),
                GateState::CredentialsPresent(value) => self.on_credentials(value).await,
                GateState::Authenticated(principal) => return Ok(principal),
                GateState::Failed(failure) => return Err(failure),
            };
        }
    }

    fn read_credentials<'r>(&self, request: &RequestView<'r>) -> GateState<'r> {
        match request.headers.get(&self.header_name) {
            None => GateState::NoCredentials,
            Some(value) => match value.to_str() {
                Ok(value) if value.trim().is_empty() => GateState::NoCredentials,
                Ok(value) => GateState::CredentialsPresent(value),
                // Opaque bytes can't carry our scheme.
                Err(_) => GateState::Failed(AuthFailure::UnsupportedScheme),
            },
        }
    }

    fn on_missing_credentials(&self, request: &RequestView<'_>) -> GateState<'static> {
        let optional = self
            .optional_routes
            .iter()
            .any(|route| route.matches(request.method, request.path));

        if optional {
            GateState::Authenticated(Principal::anonymous())
        } else {
            GateState::Failed(AuthFailure::MissingCredentials)
        }
    }

    async fn on_credentials(&self, value: &str) -> GateState<'static> {
        let mut words = value.split_whitespace();

        if words.next() != Some(self.scheme.as_str()) {
            return GateState::Failed(AuthFailure::UnsupportedScheme);
        }
        // Anything after the token is ignored.
        let Some(raw) = words.next() else {
            return GateState::Failed(AuthFailure::MissingTokenValue);
        };

        match self.authenticator.authenticate(raw).await {
            Ok(principal) => GateState::Authenticated(principal),
            Err(failed) => GateState::Failed(failed.into()),
        }
    }
}
