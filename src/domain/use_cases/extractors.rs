use actix_web::{FromRequest, HttpRequest, HttpMessage};
use futures_util::future::{ready, Ready};
use crate::{entities::session::Identity, errors::AuthError};

/// Extractor for the identity published by the access gate.
/// Returns 401 if the request did not pass through the gate.
/// Usage: Add `identity: AuthIdentity` as a parameter to your handler function.
#[derive(Debug)]
pub struct AuthIdentity(pub Identity);

impl AuthIdentity {
    pub fn owner(&self) -> &str {
        &self.0.subject
    }
}

impl FromRequest for AuthIdentity {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        match req.extensions().get::<Identity>() {
            Some(identity) => ready(Ok(AuthIdentity(identity.clone()))),
            None => ready(Err(AuthError::MissingSession.into())),
        }
    }
}
