use serde::{Deserialize, Serialize};

/// Claims carried by the `auth_token` cookie.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    pub username: String,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

/// The caller resolved from a verified token. Lives for one request only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Identity {
    pub subject: String,
    pub contact: String,
    pub issued_at: i64,
    pub expires_at: i64,
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Identity {
            subject: claims.username,
            contact: claims.email,
            issued_at: claims.iat,
            expires_at: claims.exp,
        }
    }
}

/// Handed back to whoever asked for a token.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    pub token: String,
    pub issued_at: i64,
    pub expires_at: i64,
}
