use serde::{Deserialize, Serialize};

/// Caller identity extracted from a validated access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    /// Subject claim; also the owner id of the caller's files
    pub sub: String,
    pub email: Option<String>,
    pub role: Option<String>,
    /// Raw bearer token, forwarded to remote functions
    #[serde(skip)]
    pub access_token: String,
}

impl AuthenticatedUser {
    pub fn owner_id(&self) -> &str {
        &self.sub
    }
}
