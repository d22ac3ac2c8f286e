use std::collections::BTreeSet;

use crate::services::token::TokenData;

/// Name and sole authority of the anonymous principal.
pub const ANONYMOUS: &str = "ANONYMOUS";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrincipalKind {
    /// No credentials were sent to an optional-authentication route.
    Anonymous,
    /// Identity comes from a verified token.
    Token,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PrincipalStateError {
    #[error("can't undo authentication")]
    CannotUndoAuthentication,
}

/// Identity attached to a request once the gate lets it through.
///
/// The `authenticated` flag only moves from `false` to `true`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    name: String,
    authorities: BTreeSet<String>,
    kind: PrincipalKind,
    authenticated: bool,
}

impl Principal {
    /// Low-trust principal with the single `ANONYMOUS` authority.
    pub fn anonymous() -> Self {
        Self {
            name: ANONYMOUS.to_string(),
            authorities: BTreeSet::from([ANONYMOUS.to_string()]),
            kind: PrincipalKind::Anonymous,
            authenticated: true,
        }
    }

    /// Not yet authenticated; one authority per grant.
    pub fn from_token(data: &TokenData) -> Self {
        Self {
            name: data.username().to_string(),
            authorities: data.grants().iter().map(|g| g.as_str().to_string()).collect(),
            kind: PrincipalKind::Token,
            authenticated: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn authorities(&self) -> &BTreeSet<String> {
        &self.authorities
    }

    pub fn has_authority(&self, authority: &str) -> bool {
        self.authorities.contains(authority)
    }

    pub fn kind(&self) -> PrincipalKind {
        self.kind
    }

    pub fn is_anonymous(&self) -> bool {
        self.kind == PrincipalKind::Anonymous
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn authenticate(&mut self) {
        self.authenticated = true;
    }

    /// Setting `false` on an authenticated principal is refused.
    pub fn set_authenticated(&mut self, authenticated: bool) -> Result<(), PrincipalStateError> {
        if self.authenticated && !authenticated {
            return Err(PrincipalStateError::CannotUndoAuthentication);
        }
        self.authenticated = authenticated;
        Ok(())
    }
}
