//! Login tests.
//!
//! Credential checks through the login endpoint and the session cookie it
//! hands out.


use actix_web::http::StatusCode;
use actix_web::test;
use serde_json::json;

use common::{create_test_app, login_cookie, test_manager, SESSION_COOKIE};

async fn post_login<S>(app: &S, username: &str, password: &str) -> StatusCode
where
    S: actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    >,
{
    let req = test::TestRequest::post()
        .uri("/api/v1/authc/login")
        .set_json(json!({ "username": username, "password": password }))
        .to_request();
    test::call_service(app, req).await.status()
}

#[actix_web::test]
async fn test_login_sets_session_cookie() {
    let app = create_test_app(test_manager()).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/authc/login")
        .set_json(json!({ "username": "admin", "password": "admin" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let cookie = resp
        .response()
        .cookies()
        .find(|c| c.name() == SESSION_COOKIE)
        .map(|c| c.into_owned())
        .unwrap();
    assert!(!cookie.value().is_empty());
    assert_eq!(cookie.http_only(), Some(true));
    assert_eq!(cookie.path(), Some("/"));

    let body = test::read_body(resp).await;
    assert_eq!(body, "Logged in: admin");
}

#[actix_web::test]
async fn test_wrong_password_rejected() {
    let app = create_test_app(test_manager()).await;
    assert_eq!(post_login(&app, "admin", "nope").await, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_unknown_user_rejected() {
    let app = create_test_app(test_manager()).await;
    assert_eq!(post_login(&app, "nobody", "admin").await, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_locked_account_rejected() {
    let app = create_test_app(test_manager()).await;
    assert_eq!(post_login(&app, "locked", "locked").await, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_session_cookie_authenticates() {
    let app = create_test_app(test_manager()).await;
    let cookie = login_cookie(&app, "user", "user").await;

    let req = test::TestRequest::get()
        .uri("/profile")
        .cookie(cookie.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(test::read_body(resp).await, "Profile: user");

    // Anonymous pages still see the user.
    let req = test::TestRequest::get().uri("/").cookie(cookie).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(test::read_body(resp).await, "Welcome back, user!");
}

#[actix_web::test]
async fn test_each_login_gets_its_own_session() {
    let app = create_test_app(test_manager()).await;
    let first = login_cookie(&app, "admin", "admin").await;
    let second = login_cookie(&app, "admin", "admin").await;
    assert_ne!(first.value(), second.value());
}
