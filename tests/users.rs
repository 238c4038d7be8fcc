//! User endpoint integration tests, run against the in-memory stores.

mod common;

use actix_web::http::StatusCode;
use actix_web::{test, App};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use common::{bearer, setup, USER_ONE_PASSWORD};
use taskdeck::routes;
use taskdeck::store::{TaskStore, UserStore};

macro_rules! app {
    ($ctx:expr) => {
        test::init_service(
            App::new()
                .app_data($ctx.state.clone())
                .configure(routes::config),
        )
        .await
    };
}

#[actix_rt::test]
async fn test_signup_new_user() {
    let ctx = setup().await;
    let app = app!(ctx);

    let req = test::TestRequest::post()
        .uri("/users")
        .set_json(json!({
            "name": "Sudhir",
            "email": "a@b.com",
            "password": "test@123",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["user"]["name"], "Sudhir");
    assert_eq!(body["user"]["email"], "a@b.com");
    // The password must never appear in any representation.
    assert!(body["user"].get("password").is_none());
    assert!(body["user"].get("password_hash").is_none());
    assert!(body["user"].get("tokens").is_none());

    let stored = ctx
        .users
        .find_by_email("a@b.com")
        .await
        .unwrap()
        .expect("user should be persisted");
    assert_ne!(stored.password_hash, "test@123");
    // The returned token is the user's first active session.
    assert_eq!(stored.tokens, vec![body["token"].as_str().unwrap().to_string()]);
}

#[actix_rt::test]
async fn test_signup_rejects_invalid_fields() {
    let ctx = setup().await;
    let app = app!(ctx);

    for payload in [
        json!({ "name": "", "email": "x@test.com", "password": "test@123" }),
        json!({ "name": "Valid", "email": "not-an-email", "password": "test@123" }),
        json!({ "name": "Valid", "email": "x@test.com", "password": "short" }),
        json!({ "name": "Valid", "email": "x@test.com", "password": "myPassword1" }),
        json!({ "name": "Valid", "email": "x@test.com", "password": "test@123", "age": -4 }),
    ] {
        let req = test::TestRequest::post()
            .uri("/users")
            .set_json(&payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "payload: {}", payload);
    }

    assert!(ctx.users.find_by_email("x@test.com").await.unwrap().is_none());
}

#[actix_rt::test]
async fn test_signup_rejects_duplicate_email() {
    let ctx = setup().await;
    let app = app!(ctx);

    let req = test::TestRequest::post()
        .uri("/users")
        .set_json(json!({
            "name": "Impostor",
            "email": "userone@test.com",
            "password": "test@123",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn test_login_appends_a_session() {
    let ctx = setup().await;
    let app = app!(ctx);

    let req = test::TestRequest::post()
        .uri("/users/login")
        .set_json(json!({
            "email": "userone@test.com",
            "password": USER_ONE_PASSWORD,
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    let token = body["token"].as_str().unwrap();

    // The login added a second session; the fixture token is still there.
    let stored = ctx.users.find_by_id(ctx.user_one_id).await.unwrap().unwrap();
    assert_eq!(stored.tokens.len(), 2);
    assert_eq!(stored.tokens[0], ctx.token_one);
    assert_eq!(stored.tokens[1], token);
}

#[actix_rt::test]
async fn test_login_failures_are_indistinguishable() {
    let ctx = setup().await;
    let app = app!(ctx);

    let wrong_password = test::TestRequest::post()
        .uri("/users/login")
        .set_json(json!({ "email": "userone@test.com", "password": "wrong@123" }))
        .to_request();
    let resp_wrong = test::call_service(&app, wrong_password).await;
    assert_eq!(resp_wrong.status(), StatusCode::BAD_REQUEST);
    let body_wrong: Value = test::read_body_json(resp_wrong).await;

    let no_such_user = test::TestRequest::post()
        .uri("/users/login")
        .set_json(json!({ "email": "nobody@test.com", "password": "wrong@123" }))
        .to_request();
    let resp_missing = test::call_service(&app, no_such_user).await;
    assert_eq!(resp_missing.status(), StatusCode::BAD_REQUEST);
    let body_missing: Value = test::read_body_json(resp_missing).await;

    // Same status, same body: no user enumeration.
    assert_eq!(body_wrong, body_missing);
}

#[actix_rt::test]
async fn test_get_profile() {
    let ctx = setup().await;
    let app = app!(ctx);

    let req = test::TestRequest::get()
        .uri("/users/me")
        .insert_header(bearer(&ctx.token_one))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["email"], "userone@test.com");
    assert!(body.get("password").is_none());
    assert!(body.get("tokens").is_none());
}

#[actix_rt::test]
async fn test_get_profile_requires_auth() {
    let ctx = setup().await;
    let app = app!(ctx);

    let req = test::TestRequest::get().uri("/users/me").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get()
        .uri("/users/me")
        .insert_header(bearer("not.a.real.token"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn test_logout_revokes_only_the_presented_token() {
    let ctx = setup().await;
    let app = app!(ctx);

    // Open a second session.
    let login = test::TestRequest::post()
        .uri("/users/login")
        .set_json(json!({ "email": "userone@test.com", "password": USER_ONE_PASSWORD }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, login).await;
    let second_token = body["token"].as_str().unwrap().to_string();

    // Log out the first session.
    let req = test::TestRequest::post()
        .uri("/users/logout")
        .insert_header(bearer(&ctx.token_one))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    // The revoked token no longer authenticates; the other one still does.
    let req = test::TestRequest::get()
        .uri("/users/me")
        .insert_header(bearer(&ctx.token_one))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNAUTHORIZED
    );

    let req = test::TestRequest::get()
        .uri("/users/me")
        .insert_header(bearer(&second_token))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
}

#[actix_rt::test]
async fn test_logout_all_clears_every_session() {
    let ctx = setup().await;
    let app = app!(ctx);

    let login = test::TestRequest::post()
        .uri("/users/login")
        .set_json(json!({ "email": "userone@test.com", "password": USER_ONE_PASSWORD }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, login).await;
    let second_token = body["token"].as_str().unwrap().to_string();

    let req = test::TestRequest::post()
        .uri("/users/logoutAll")
        .insert_header(bearer(&second_token))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    for token in [&ctx.token_one, &second_token] {
        let req = test::TestRequest::get()
            .uri("/users/me")
            .insert_header(bearer(token))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::UNAUTHORIZED
        );
    }
}

#[actix_rt::test]
async fn test_update_profile_name() {
    let ctx = setup().await;
    let app = app!(ctx);

    let req = test::TestRequest::patch()
        .uri("/users/me")
        .insert_header(bearer(&ctx.token_one))
        .set_json(json!({ "name": "User One Changed Name" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["name"], "User One Changed Name");

    let stored = ctx.users.find_by_id(ctx.user_one_id).await.unwrap().unwrap();
    assert_eq!(stored.name, "User One Changed Name");
}

#[actix_rt::test]
async fn test_update_profile_rejects_unknown_fields() {
    let ctx = setup().await;
    let app = app!(ctx);

    let req = test::TestRequest::patch()
        .uri("/users/me")
        .insert_header(bearer(&ctx.token_one))
        .set_json(json!({ "location": "Pune" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn test_update_profile_rehashes_password() {
    let ctx = setup().await;
    let app = app!(ctx);

    let req = test::TestRequest::patch()
        .uri("/users/me")
        .insert_header(bearer(&ctx.token_one))
        .set_json(json!({ "password": "brand-new@456" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let stored = ctx.users.find_by_id(ctx.user_one_id).await.unwrap().unwrap();
    assert_ne!(stored.password_hash, "brand-new@456");

    // Old password no longer works, the new one does.
    let old = test::TestRequest::post()
        .uri("/users/login")
        .set_json(json!({ "email": "userone@test.com", "password": USER_ONE_PASSWORD }))
        .to_request();
    assert_eq!(
        test::call_service(&app, old).await.status(),
        StatusCode::BAD_REQUEST
    );

    let new = test::TestRequest::post()
        .uri("/users/login")
        .set_json(json!({ "email": "userone@test.com", "password": "brand-new@456" }))
        .to_request();
    assert_eq!(test::call_service(&app, new).await.status(), StatusCode::OK);
}

#[actix_rt::test]
async fn test_update_profile_validates_fields() {
    let ctx = setup().await;
    let app = app!(ctx);

    for payload in [
        json!({ "email": "not-an-email" }),
        json!({ "email": "usertwo@test.com" }), // taken by the other user
        json!({ "password": "short" }),
        json!({ "age": -1 }),
        json!({ "name": "   " }),
    ] {
        let req = test::TestRequest::patch()
            .uri("/users/me")
            .insert_header(bearer(&ctx.token_one))
            .set_json(&payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "payload: {}", payload);
    }
}

#[actix_rt::test]
async fn test_delete_account_cascades_to_tasks() {
    let ctx = setup().await;
    let app = app!(ctx);

    let req = test::TestRequest::delete()
        .uri("/users/me")
        .insert_header(bearer(&ctx.token_one))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    assert!(ctx.users.find_by_id(ctx.user_one_id).await.unwrap().is_none());

    // Both of user one's tasks are gone, by any actor's view.
    for task_id in [ctx.task_one_id, ctx.task_two_id] {
        assert!(ctx
            .tasks
            .find_for_owner(ctx.user_one_id, task_id)
            .await
            .unwrap()
            .is_none());
    }
    // User two's task is untouched.
    assert!(ctx
        .tasks
        .find_for_owner(ctx.user_two_id, ctx.task_three_id)
        .await
        .unwrap()
        .is_some());
}

#[actix_rt::test]
async fn test_delete_account_requires_auth() {
    let ctx = setup().await;
    let app = app!(ctx);

    let req = test::TestRequest::delete().uri("/users/me").to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNAUTHORIZED
    );
    assert!(ctx.users.find_by_id(ctx.user_one_id).await.unwrap().is_some());
}

const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0x00];

#[actix_rt::test]
async fn test_avatar_lifecycle() {
    let ctx = setup().await;
    let app = app!(ctx);

    // Upload.
    let req = test::TestRequest::post()
        .uri("/users/me/avatar")
        .insert_header(bearer(&ctx.token_one))
        .set_payload(PNG_BYTES)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let stored = ctx.users.find_by_id(ctx.user_one_id).await.unwrap().unwrap();
    assert_eq!(stored.avatar.as_deref(), Some(PNG_BYTES));

    // The profile now references the avatar by URL, never by bytes.
    let req = test::TestRequest::get()
        .uri("/users/me")
        .insert_header(bearer(&ctx.token_one))
        .to_request();
    let profile: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(
        profile["avatar"],
        format!("/users/{}/avatar", ctx.user_one_id)
    );

    // Fetching the avatar is public.
    let req = test::TestRequest::get()
        .uri(&format!("/users/{}/avatar", ctx.user_one_id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get("content-type").unwrap(),
        "image/png"
    );
    let body = test::read_body(resp).await;
    assert_eq!(&body[..], PNG_BYTES);

    // Clear it; the URL then 404s.
    let req = test::TestRequest::delete()
        .uri("/users/me/avatar")
        .insert_header(bearer(&ctx.token_one))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri(&format!("/users/{}/avatar", ctx.user_one_id))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NOT_FOUND
    );
}

#[actix_rt::test]
async fn test_jpeg_avatar_is_served_as_jpeg() {
    let ctx = setup().await;
    let app = app!(ctx);

    let jpeg_bytes: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];
    let req = test::TestRequest::post()
        .uri("/users/me/avatar")
        .insert_header(bearer(&ctx.token_one))
        .set_payload(jpeg_bytes)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri(&format!("/users/{}/avatar", ctx.user_one_id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get("content-type").unwrap(),
        "image/jpeg"
    );
    let body = test::read_body(resp).await;
    assert_eq!(&body[..], jpeg_bytes);
}

#[actix_rt::test]
async fn test_avatar_rejects_non_images() {
    let ctx = setup().await;
    let app = app!(ctx);

    let req = test::TestRequest::post()
        .uri("/users/me/avatar")
        .insert_header(bearer(&ctx.token_one))
        .set_payload("definitely not an image")
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::BAD_REQUEST
    );

    let stored = ctx.users.find_by_id(ctx.user_one_id).await.unwrap().unwrap();
    assert!(stored.avatar.is_none());
}
