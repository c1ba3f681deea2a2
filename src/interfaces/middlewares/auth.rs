use actix_web::{
    body::BoxBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage, ResponseError,
};
use chrono::Utc;
use futures_util::future::{ok, Ready, LocalBoxFuture};
use std::{rc::Rc, sync::Arc, task::{Context, Poll}};

use crate::{
    auth::cookie::session_cookie,
    constants::SESSION_COOKIE_NAME,
    entities::session::Identity,
    errors::AuthError,
    repositories::session::SessionTokenService,
};

/// Guards a scope behind the `auth_token` cookie.
///
/// On success the caller's [`Identity`] is stored in the request extensions.
/// Tokens inside the renewal window are reissued before the handler runs,
/// and the fresh cookie is attached to whatever the handler returns.
#[derive(Clone)]
pub struct AccessGate {
    sessions: Arc<dyn SessionTokenService>,
    secure_cookies: bool,
}

impl AccessGate {
    pub fn new(sessions: Arc<dyn SessionTokenService>, secure_cookies: bool) -> Self {
        AccessGate { sessions, secure_cookies }
    }
}

impl<S> Transform<S, ServiceRequest> for AccessGate
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error> + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type InitError = ();
    type Transform = AccessGateService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(AccessGateService {
            service: Rc::new(service),
            sessions: Arc::clone(&self.sessions),
            secure_cookies: self.secure_cookies,
        })
    }
}

pub struct AccessGateService<S> {
    service: Rc<S>,
    sessions: Arc<dyn SessionTokenService>,
    secure_cookies: bool,
}

impl<S> Service<ServiceRequest> for AccessGateService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error> + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let sessions = Arc::clone(&self.sessions);
        let secure_cookies = self.secure_cookies;

        Box::pin(async move {
            if req.method() == actix_web::http::Method::OPTIONS {
                return service.call(req).await;
            }

            let identity = match resolve_identity(&req, sessions.as_ref()) {
                Ok(identity) => identity,
                Err(e) => {
                    tracing::warn!(path = %req.path(), "Request rejected by access gate: {}", e);
                    return Ok(custom_error_response(req, e));
                }
            };

            let renewal = if sessions.needs_renewal_at(&identity, Utc::now().timestamp()) {
                match sessions.issue(&identity.subject, &identity.contact) {
                    Ok(issued) => {
                        tracing::info!(subject = %identity.subject, "Session renewed");
                        Some(session_cookie(&issued.token, issued.expires_at, secure_cookies))
                    }
                    Err(e) => return Ok(custom_error_response(req, e)),
                }
            } else {
                None
            };

            req.extensions_mut().insert(identity);
            let mut res = service.call(req).await?;

            if let Some(cookie) = renewal {
                if let Err(e) = res.response_mut().add_cookie(&cookie) {
                    tracing::error!("Failed to attach renewed session cookie: {}", e);
                }
            }
            Ok(res)
        })
    }
}

fn extract_token(req: &ServiceRequest) -> Option<String> {
    req.cookie(SESSION_COOKIE_NAME)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
}

/// Cookie present, signature valid, and not yet expired.
fn resolve_identity(req: &ServiceRequest, sessions: &dyn SessionTokenService) -> Result<Identity, AuthError> {
    let token = extract_token(req).ok_or(AuthError::MissingSession)?;
    let identity = sessions.parse_and_verify(&token)?;

    if !sessions.is_fresh_at(&identity, Utc::now().timestamp()) {
        return Err(AuthError::SessionExpired);
    }
    Ok(identity)
}

fn custom_error_response(req: ServiceRequest, err: AuthError) -> ServiceResponse<BoxBody> {
    req.into_response(err.error_response())
}
