mod test_utils;

use actix_web::{http::header, http::StatusCode, test};
use serde_json::{json, Value};
use test_utils::*;

fn upload_request(owner: &str, file_name: &str, content: &[u8]) -> test::TestRequest {
    test::TestRequest::post()
        .uri("/api/v1/images")
        .cookie(session_cookie_for(owner))
        .insert_header((header::CONTENT_TYPE, multipart_content_type()))
        .set_payload(multipart_body(file_name, "image/png", content))
}

#[actix_rt::test]
async fn image_lifecycle_end_to_end() {
    let app = test::init_service(test_app(test_state())).await;

    // upload
    let res = test::call_service(&app, upload_request("alice", "Holiday.png", &png_bytes(800, 400)).to_request()).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let uploaded: Value = test::read_body_json(res).await;
    let image_id = uploaded["image"]["id"].as_str().expect("image id").to_owned();
    let thumbnail_id = uploaded["thumbnail"]["id"].as_str().expect("thumbnail id").to_owned();
    assert_eq!(uploaded["image"]["name"], "Holiday");
    assert_eq!(uploaded["image"]["extension"], "png");
    assert_eq!(uploaded["image"]["owner"], "alice");
    assert_eq!(uploaded["thumbnail"]["image_id"], image_id.as_str());

    // list
    let req = test::TestRequest::get()
        .uri("/api/v1/thumbnails?page_size=5")
        .cookie(session_cookie_for("alice"))
        .to_request();
    let page: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(page["items"].as_array().map(Vec::len), Some(1));
    assert_eq!(page["items"][0]["id"], thumbnail_id.as_str());
    assert_eq!(page["next_cursor"], Value::Null);

    // rename
    let req = test::TestRequest::put()
        .uri("/api/v1/images")
        .cookie(session_cookie_for("alice"))
        .set_json(json!({"id": image_id, "name": "Vacation", "thumbnail_id": thumbnail_id}))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let renamed: Value = test::read_body_json(res).await;
    assert_eq!(renamed["image"]["updated_fields"]["name"], "Vacation");
    assert_eq!(renamed["thumbnail"]["updated_fields"]["name"], "Vacation");

    // fetch
    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/images/{image_id}"))
        .cookie(session_cookie_for("alice"))
        .to_request();
    let fetched: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(fetched["name"], "Vacation");
    assert!(fetched["content_file"].as_str().is_some_and(|c| !c.is_empty()));

    // delete
    let req = test::TestRequest::delete()
        .uri("/api/v1/images")
        .cookie(session_cookie_for("alice"))
        .set_json(json!({"id": image_id, "thumbnail_id": thumbnail_id}))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let deleted: Value = test::read_body_json(res).await;
    assert_eq!(deleted["thumbnail_deleted"], true);
    assert!(deleted.get("cascade_error").is_none());

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/images/{image_id}"))
        .cookie(session_cookie_for("alice"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn other_owners_cannot_see_an_image() {
    let app = test::init_service(test_app(test_state())).await;

    let uploaded: Value =
        test::call_and_read_body_json(&app, upload_request("alice", "mine.png", &png_bytes(10, 10)).to_request()).await;
    let image_id = uploaded["image"]["id"].as_str().unwrap().to_owned();

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/images/{image_id}"))
        .cookie(session_cookie_for("bob"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get()
        .uri("/api/v1/thumbnails")
        .cookie(session_cookie_for("bob"))
        .to_request();
    let page: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(page["items"].as_array().map(Vec::len), Some(0));
}

#[actix_rt::test]
async fn duplicate_upload_is_a_conflict() {
    let app = test::init_service(test_app(test_state())).await;
    let png = png_bytes(16, 16);

    let res = test::call_service(&app, upload_request("alice", "cat.png", &png).to_request()).await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = test::call_service(&app, upload_request("alice", "cat.png", &png).to_request()).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = test::call_service(&app, upload_request("bob", "cat.png", &png).to_request()).await;
    assert_eq!(res.status(), StatusCode::CREATED);
}

#[actix_rt::test]
async fn non_image_upload_is_rejected() {
    let app = test::init_service(test_app(test_state())).await;

    let res = test::call_service(&app, upload_request("alice", "notes.png", b"just some text").to_request()).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn gallery_routes_require_a_session() {
    let app = test::init_service(test_app(test_state())).await;

    let req = test::TestRequest::get().uri("/api/v1/thumbnails").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::delete().uri("/api/v1/images/all").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn signed_token_without_email_is_unauthenticated() {
    let app = test::init_service(test_app(test_state())).await;
    let now = chrono::Utc::now().timestamp();
    let token = signed_claims(&json!({"username": "alice", "iat": now, "exp": now + 3600}));

    let req = test::TestRequest::get()
        .uri("/api/v1/thumbnails")
        .cookie(actix_web::cookie::Cookie::new("auth_token", token))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn empty_rename_is_a_bad_request() {
    let app = test::init_service(test_app(test_state())).await;

    let req = test::TestRequest::put()
        .uri("/api/v1/images")
        .cookie(session_cookie_for("alice"))
        .set_json(json!({"id": "a", "name": "", "thumbnail_id": "b"}))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["error"], "No fields to update");
}

#[actix_rt::test]
async fn malformed_json_gets_a_json_error() {
    let app = test::init_service(test_app(test_state())).await;

    let req = test::TestRequest::put()
        .uri("/api/v1/images")
        .cookie(session_cookie_for("alice"))
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_payload("{not json")
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert!(body["error"].as_str().is_some_and(|e| e.starts_with("JSON payload error")));
}

#[actix_rt::test]
async fn delete_all_reports_counts() {
    let app = test::init_service(test_app(test_state())).await;
    for name in ["a.png", "b.png"] {
        test::call_service(&app, upload_request("alice", name, &png_bytes(8, 8)).to_request()).await;
    }

    let req = test::TestRequest::delete()
        .uri("/api/v1/images/all")
        .cookie(session_cookie_for("alice"))
        .to_request();
    let counts: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(counts, json!({"images": 2, "thumbnails": 2}));
}

#[actix_rt::test]
async fn bad_cursor_is_a_bad_request() {
    let app = test::init_service(test_app(test_state())).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/thumbnails?last_id=nope")
        .cookie(session_cookie_for("alice"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn health_reports_repository_status() {
    let app = test::init_service(test_app(test_state())).await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["repository"], "OK");
    assert_eq!(body["repository_backend"], "memory");
}

#[actix_rt::test]
async fn logout_expires_the_cookie() {
    let app = test::init_service(test_app(test_state())).await;

    let req = test::TestRequest::post().uri("/api/v1/auth/logout").to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);

    let cookie = res
        .response()
        .cookies()
        .find(|c| c.name() == "auth_token")
        .expect("removal cookie is set");
    assert_eq!(cookie.value(), "");
    assert_eq!(cookie.max_age(), Some(actix_web::cookie::time::Duration::ZERO));
}

#[actix_rt::test]
async fn unknown_routes_return_json_404() {
    let app = test::init_service(test_app(test_state())).await;

    let req = test::TestRequest::get().uri("/nowhere").to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["error"], "Not found");
}

#[actix_rt::test]
async fn home_lists_endpoints() {
    let app = test::init_service(test_app(test_state())).await;

    let req = test::TestRequest::get().uri("/").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "Ok");
}
