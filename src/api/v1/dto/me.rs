use serde::Serialize;

use crate::services::auth::Principal;

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub name: String,
    pub authorities: Vec<String>,
    pub anonymous: bool,
}

impl From<&Principal> for MeResponse {
    fn from(principal: &Principal) -> Self {
        Self {
            name: principal.name().to_string(),
            authorities: principal.authorities().iter().cloned().collect(),
            anonymous: principal.is_anonymous(),
        }
    }
}
