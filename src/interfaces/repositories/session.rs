use chrono::Utc;

use crate::constants::RENEWAL_WINDOW_SECS;
use crate::entities::session::{Identity, IssuedToken};
use crate::errors::AuthError;

/// Issues and verifies session tokens. Holds no server-side state.
pub trait SessionTokenService: Send + Sync {
    /// Signs a token for `subject`/`contact` issued at `now` (unix seconds).
    fn issue_at(&self, subject: &str, contact: &str, now: i64) -> Result<IssuedToken, AuthError>;

    /// Checks signature and claim shape only. Expiry is left to the caller.
    fn parse_and_verify(&self, token: &str) -> Result<Identity, AuthError>;

    fn issue(&self, subject: &str, contact: &str) -> Result<IssuedToken, AuthError> {
        self.issue_at(subject, contact, Utc::now().timestamp())
    }

    fn is_fresh_at(&self, identity: &Identity, now: i64) -> bool {
        now < identity.expires_at
    }

    fn is_fresh(&self, identity: &Identity) -> bool {
        self.is_fresh_at(identity, Utc::now().timestamp())
    }

    fn needs_renewal_at(&self, identity: &Identity, now: i64) -> bool {
        identity.expires_at - now < RENEWAL_WINDOW_SECS
    }

    fn needs_renewal(&self, identity: &Identity) -> bool {
        self.needs_renewal_at(identity, Utc::now().timestamp())
    }
}
