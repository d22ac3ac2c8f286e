pub mod authenticator;
pub mod factory;
pub mod gate;
pub mod principal;
pub mod route_matcher;

pub use authenticator::{AuthenticationFailed, TokenAuthenticator};
pub use factory::{AuthSetupError, build_codec, build_gate, build_revocation_checker};
pub use gate::{AuthFailure, AuthenticationGate, FailureClass, RequestView};
pub use principal::{ANONYMOUS, Principal, PrincipalKind, PrincipalStateError};
pub use route_matcher::{RouteMatcher, RouteMatcherError};
