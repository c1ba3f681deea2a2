mod test_utils;

use std::sync::Arc;

use actix_web::{http::StatusCode, test, web, App, HttpResponse};
use chrono::Utc;
use gallery_backend::{
    entities::session::{Identity, IssuedToken},
    errors::AuthError,
    middlewares::auth::AccessGate,
    repositories::session::SessionTokenService,
    use_cases::extractors::AuthIdentity,
};
use mockall::mock;
use test_utils::*;

mock! {
    pub Sessions {}

    impl SessionTokenService for Sessions {
        fn issue_at(&self, subject: &str, contact: &str, now: i64) -> Result<IssuedToken, AuthError>;
        fn parse_and_verify(&self, token: &str) -> Result<Identity, AuthError>;
    }
}

async fn whoami(identity: AuthIdentity) -> HttpResponse {
    HttpResponse::Ok().body(identity.owner().to_owned())
}

async fn preflight() -> HttpResponse {
    HttpResponse::NoContent().finish()
}

fn gated_app(
    gate: AccessGate,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new().service(
        web::scope("/private")
            .wrap(gate)
            .route("/whoami", web::get().to(whoami)),
    )
}

fn renewed_cookie<B>(res: &actix_web::dev::ServiceResponse<B>) -> Option<String> {
    res.response()
        .cookies()
        .find(|c| c.name() == "auth_token")
        .map(|c| c.value().to_owned())
}

#[actix_rt::test]
async fn missing_cookie_is_unauthorized() {
    let app = test::init_service(gated_app(AccessGate::new(shared_sessions(), false))).await;

    let req = test::TestRequest::get().uri("/private/whoami").to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = test::read_body_json(res).await;
    assert_eq!(body["error"], "No active session found");
}

#[actix_rt::test]
async fn invalid_token_is_unauthorized() {
    let app = test::init_service(gated_app(AccessGate::new(shared_sessions(), false))).await;

    let req = test::TestRequest::get()
        .uri("/private/whoami")
        .cookie(actix_web::cookie::Cookie::new("auth_token", "forged"))
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn expired_token_is_unauthorized() {
    let app = test::init_service(gated_app(AccessGate::new(shared_sessions(), false))).await;

    let issued_at = Utc::now().timestamp() - 7200 - 5;
    let req = test::TestRequest::get()
        .uri("/private/whoami")
        .cookie(session_cookie_issued_at("alice", issued_at))
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = test::read_body_json(res).await;
    assert_eq!(body["error"], "Session expired");
}

#[actix_rt::test]
async fn fresh_token_reaches_handler_without_renewal() {
    let app = test::init_service(gated_app(AccessGate::new(shared_sessions(), false))).await;

    let req = test::TestRequest::get()
        .uri("/private/whoami")
        .cookie(session_cookie_for("alice"))
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::OK);
    assert!(renewed_cookie(&res).is_none());
    assert_eq!(test::read_body(res).await, "alice");
}

#[actix_rt::test]
async fn token_near_expiry_is_renewed() {
    let app = test::init_service(gated_app(AccessGate::new(shared_sessions(), false))).await;

    // Five minutes left on a two hour session.
    let issued_at = Utc::now().timestamp() - 7200 + 300;
    let old = session_cookie_issued_at("alice", issued_at);
    let req = test::TestRequest::get()
        .uri("/private/whoami")
        .cookie(old.clone())
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::OK);
    let renewed = renewed_cookie(&res).expect("renewal cookie should be set");
    assert_ne!(renewed, old.value());

    let identity = session_manager().parse_and_verify(&renewed).unwrap();
    assert_eq!(identity.subject, "alice");
    assert!(!session_manager().needs_renewal(&identity));
}

#[actix_rt::test]
async fn options_requests_pass_through() {
    let app = test::init_service(
        App::new().service(
            web::scope("/private")
                .wrap(AccessGate::new(shared_sessions(), false))
                .route("/ping", web::method(actix_web::http::Method::OPTIONS).to(preflight)),
        ),
    )
    .await;

    let req = test::TestRequest::default()
        .method(actix_web::http::Method::OPTIONS)
        .uri("/private/ping")
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::NO_CONTENT);
}

#[actix_rt::test]
async fn failed_renewal_stops_the_request() {
    let now = Utc::now().timestamp();
    let mut sessions = MockSessions::new();
    sessions.expect_parse_and_verify().returning(move |_| {
        Ok(Identity {
            subject: "alice".into(),
            contact: "alice@example.com".into(),
            issued_at: now - 7000,
            expires_at: now + 200,
        })
    });
    sessions
        .expect_issue_at()
        .times(1)
        .returning(|_, _, _| Err(AuthError::TokenCreation));

    let gate = AccessGate::new(Arc::new(sessions), false);
    let app = test::init_service(gated_app(gate)).await;

    let req = test::TestRequest::get()
        .uri("/private/whoami")
        .cookie(actix_web::cookie::Cookie::new("auth_token", "anything"))
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(renewed_cookie(&res).is_none());
    let body = test::read_body(res).await;
    assert_ne!(body, "alice");
}
