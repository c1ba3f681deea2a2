#![allow(dead_code)]

use std::io::Cursor;
use std::sync::Arc;

use actix_web::cookie::Cookie;
use actix_web::{middleware::NormalizePath, web, App};
use gallery_backend::{
    auth::jwt::SessionManager,
    repositories::{registry::Repositories, session::SessionTokenService},
    routes::configure_routes,
    settings::{AppConfig, AppEnvironment},
    AppState,
};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};

pub const TEST_SECRET: &str = "super_test_secret_key_for_session_signing";
pub const BOUNDARY: &str = "----gallery-test-boundary";

pub fn test_config() -> AppConfig {
    AppConfig {
        env: AppEnvironment::Testing,
        name: "Gallery-Test".to_string(),
        port: 0,
        host: "127.0.0.1".to_string(),
        worker_count: 1,
        cors_allowed_origins: vec!["*".to_string()],
        jwt_secret: TEST_SECRET.to_string(),
        secure_cookies: false,
        repository_backend: "memory".to_string(),
        database_url: String::new(),
        database_name: "gallery_test".to_string(),
        repository_timeout_secs: 5,
    }
}

pub fn session_manager() -> SessionManager {
    SessionManager::from_secret(TEST_SECRET)
}

pub fn test_state() -> web::Data<AppState> {
    web::Data::new(AppState::new(&test_config(), Repositories::in_memory()))
}

/// The full application as `main` assembles it, minus CORS and tracing.
pub fn test_app(
    state: web::Data<AppState>,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let gate = state.access_gate();
    App::new()
        .app_data(state)
        .wrap(NormalizePath::trim())
        .configure(configure_routes(gate))
}

/// A valid session cookie for `subject`, issued now.
pub fn session_cookie_for(subject: &str) -> Cookie<'static> {
    let issued = session_manager()
        .issue(subject, &format!("{subject}@example.com"))
        .expect("token should sign");
    Cookie::new("auth_token", issued.token)
}

/// Session cookie issued at `issued_at` (unix seconds).
pub fn session_cookie_issued_at(subject: &str, issued_at: i64) -> Cookie<'static> {
    let issued = session_manager()
        .issue_at(subject, &format!("{subject}@example.com"), issued_at)
        .expect("token should sign");
    Cookie::new("auth_token", issued.token)
}

/// Signs arbitrary claims with the test secret, well-formed or not.
pub fn signed_claims(claims: &serde_json::Value) -> String {
    jsonwebtoken::encode(
        &jsonwebtoken::Header::new(jsonwebtoken::Algorithm::HS256),
        claims,
        &jsonwebtoken::EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .expect("claims should sign")
}

pub fn shared_sessions() -> Arc<dyn SessionTokenService> {
    Arc::new(session_manager())
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba([200, 30, 30, 255]));
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(img)
        .write_to(&mut buf, ImageFormat::Png)
        .expect("png should encode");
    buf.into_inner()
}

/// A `multipart/form-data` body carrying one `file` field.
pub fn multipart_body(file_name: &str, content_type: &str, content: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={BOUNDARY}")
}
