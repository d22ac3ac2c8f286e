//! String to [`Grant`] resolution.
//!
//! The authorization side owns the set of known grants. The validator only asks a
//! resolver to map each wire string; strings it cannot map are dropped from the decoded
//! token instead of failing it.

use std::fmt;
use std::str::FromStr;

use super::data::Grant;

/// Maps a wire string into a known grant.
pub trait GrantResolver: Send + Sync {
    /// `None` means the string does not name any grant this service knows about.
    fn resolve(&self, raw: &str) -> Option<Grant>;
}

impl<F> GrantResolver for F
where
    F: Fn(&str) -> Option<Grant> + Send + Sync,
{
    fn resolve(&self, raw: &str) -> Option<Grant> {
        self(raw)
    }
}

/// Simple role grants: a plain user and an administrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoleGrant {
    RoleUser,
    RoleAdmin,
}

impl RoleGrant {
    pub const ALL: [RoleGrant; 2] = [RoleGrant::RoleUser, RoleGrant::RoleAdmin];

    /// Canonical wire form (`role-user`, `role-admin`).
    pub fn as_str(&self) -> &'static str {
        match self {
            RoleGrant::RoleUser => "role-user",
            RoleGrant::RoleAdmin => "role-admin",
        }
    }
}

impl fmt::Display for RoleGrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown role grant")]
pub struct UnknownRoleGrant;

impl FromStr for RoleGrant {
    type Err = UnknownRoleGrant;

    // Accepts `role-user`, `ROLE_USER`, `Role-User`, ...
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().replace('_', "-").to_ascii_lowercase();
        RoleGrant::ALL
            .into_iter()
            .find(|role| role.as_str() == normalized)
            .ok_or(UnknownRoleGrant)
    }
}

impl From<RoleGrant> for Grant {
    fn from(role: RoleGrant) -> Self {
        Grant::new(role.as_str())
    }
}

/// Default resolver: only [`RoleGrant`] values are recognized.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoleGrantResolver;

impl GrantResolver for RoleGrantResolver {
    fn resolve(&self, raw: &str) -> Option<Grant> {
        raw.parse::<RoleGrant>().ok().map(Grant::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_grants_resolve_case_and_separator_insensitively() {
        let resolver = RoleGrantResolver;

        assert_eq!(resolver.resolve("role-user"), Some(Grant::new("role-user")));
        assert_eq!(resolver.resolve("ROLE_ADMIN"), Some(Grant::new("role-admin")));
        assert_eq!(resolver.resolve("Role-User"), Some(Grant::new("role-user")));
    }

    #[test]
    fn unknown_role_is_not_resolved() {
        let resolver = RoleGrantResolver;

        assert_eq!(resolver.resolve("role-superuser"), None);
        assert_eq!(resolver.resolve(""), None);
    }

    #[test]
    fn closures_work_as_resolvers() {
        let resolver = |raw: &str| raw.starts_with("scope:").then(|| Grant::new(raw));

        assert_eq!(resolver.resolve("scope:read"), Some(Grant::new("scope:read")));
        assert_eq!(resolver.resolve("read"), None);
    }
}
