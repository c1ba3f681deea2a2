use actix_web::{post, web, HttpResponse, Responder};

use crate::auth::cookie::removal_cookie;
use crate::AppState;

/// Sessions live only in the cookie, so logging out just expires it.
#[post("/logout")]
pub async fn logout(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok()
        .cookie(removal_cookie(state.secure_cookies))
        .json(serde_json::json!({"message": "Logged out successfully"}))
}
