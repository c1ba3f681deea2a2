use actix_web::cookie::{
    time::{Duration, OffsetDateTime},
    Cookie, SameSite,
};

use crate::constants::{SESSION_COOKIE_NAME, SESSION_LIFETIME_SECS};

/// `auth_token` cookie expiring at `expires_at` (unix seconds).
pub fn session_cookie(token: &str, expires_at: i64, secure: bool) -> Cookie<'static> {
    let expires = OffsetDateTime::from_unix_timestamp(expires_at)
        .unwrap_or_else(|_| OffsetDateTime::now_utc() + Duration::seconds(SESSION_LIFETIME_SECS));

    Cookie::build(SESSION_COOKIE_NAME, token.to_owned())
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .expires(expires)
        .finish()
}

/// Overwrites the session cookie with an already-expired empty one.
pub fn removal_cookie(secure: bool) -> Cookie<'static> {
    let mut cookie = Cookie::build(SESSION_COOKIE_NAME, "")
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .finish();
    cookie.make_removal();
    cookie
}
