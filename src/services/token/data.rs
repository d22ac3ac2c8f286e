use std::collections::BTreeSet;
use std::fmt;

/// A capability or role tag attached to a principal.
///
/// On the wire a grant is its string form. Which strings are meaningful is decided by a
/// [`GrantResolver`](super::grants::GrantResolver), not by this type.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Grant(String);

impl Grant {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Grant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Decoded identity and authorization payload of a token.
///
/// Built by the caller for issuance and by the validator after a successful decode.
/// Never mutated: there are no setters.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenData {
    id: i64,
    username: String,
    grants: BTreeSet<Grant>,
}

impl TokenData {
    pub fn new(id: i64, username: impl Into<String>, grants: impl IntoIterator<Item = Grant>) -> Self {
        Self {
            id,
            username: username.into(),
            grants: grants.into_iter().collect(),
        }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Grants in their canonical (sorted) order.
    pub fn grants(&self) -> &BTreeSet<Grant> {
        &self.grants
    }
}

impl fmt::Debug for TokenData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Username is personal data; keep it out of logs.
        f.debug_struct("TokenData")
            .field("id", &self.id)
            .field("username", &"[REDACTED]")
            .field("grants", &self.grants)
            .finish()
    }
}
