use chrono::Duration;
use jsonwebtoken::{decode, encode, Algorithm, Header, Validation};

use crate::constants::SESSION_LIFETIME_SECS;
use crate::entities::session::{Claims, Identity, IssuedToken};
use crate::errors::AuthError;
use crate::repositories::session::SessionTokenService;
use crate::settings::{AppConfig, JwtKeys};

const JWT_ALGORITHM: Algorithm = Algorithm::HS256;

#[derive(Clone)]
pub struct SessionManager {
    keys: JwtKeys,
    lifetime: Duration,
}

impl SessionManager {
    pub fn new(config: &AppConfig) -> Self {
        SessionManager {
            keys: JwtKeys::from(config),
            lifetime: Duration::seconds(SESSION_LIFETIME_SECS),
        }
    }

    pub fn from_secret(secret: &str) -> Self {
        SessionManager {
            keys: JwtKeys::from_secret(secret),
            lifetime: Duration::seconds(SESSION_LIFETIME_SECS),
        }
    }

    fn validation() -> Validation {
        let mut validation = Validation::new(JWT_ALGORITHM);
        // Freshness is decided by `is_fresh`, not while decoding.
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp"]);
        validation
    }
}

impl SessionTokenService for SessionManager {
    fn issue_at(&self, subject: &str, contact: &str, now: i64) -> Result<IssuedToken, AuthError> {
        let exp = now + self.lifetime.num_seconds();

        let claims = Claims {
            username: subject.to_owned(),
            email: contact.to_owned(),
            iat: now,
            exp,
        };

        let token = encode(&Header::new(JWT_ALGORITHM), &claims, &self.keys.encoding)
            .map_err(|e| {
                tracing::error!("Failed to sign session token: {}", e);
                AuthError::TokenCreation
            })?;

        Ok(IssuedToken { token, issued_at: now, expires_at: exp })
    }

    fn parse_and_verify(&self, token: &str) -> Result<Identity, AuthError> {
        let data = decode::<Claims>(token, &self.keys.decoding, &Self::validation())
            .map_err(|e| {
                tracing::warn!("Rejected session token: {}", e);
                AuthError::from(e)
            })?;

        Ok(Identity::from(data.claims))
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("keys", &self.keys)
            .field("lifetime", &self.lifetime)
            .finish()
    }
}
