use serde::{Deserialize, Serialize};

/// Access token claims issued by the external auth provider.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub aud: String,
    pub exp: usize,
    #[serde(default)]
    pub iat: usize,
    pub email: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub id: String,
    pub email: Option<String>,
}

impl From<Claims> for AuthenticatedUser {
    fn from(claims: Claims) -> Self {
        Self { id: claims.sub, email: claims.email }
    }
}
