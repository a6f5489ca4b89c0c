//! Session store failure tests.
//!
//! What the middleware does when the session cache is down or slow, under
//! both store failure policies, and how denials render in status mode.


use std::sync::Arc;
use std::time::Duration;

use actix_web::cookie::Cookie;
use actix_web::http::StatusCode;
use actix_web::test;

use actix_gatekeeper_core::http::security::{
    MemorySessionStore, RedirectMode, SecuritySettings, StoreFailurePolicy,
};

use common::{
    create_test_app, location, login_cookie, manager_with, test_settings, FailingStore, SlowStore,
    LOGIN_URL, SESSION_COOKIE, UNAUTHORIZED_URL, UNKNOWN_SESSION_ID,
};

fn settings(policy: StoreFailurePolicy) -> SecuritySettings {
    SecuritySettings {
        store_failure_policy: policy,
        ..test_settings()
    }
}

// =============================================================================
// Fail Closed (default)
// =============================================================================

#[actix_web::test]
async fn test_failing_store_treats_caller_as_anonymous() {
    let manager = manager_with(&settings(StoreFailurePolicy::FailClosed), Arc::new(FailingStore));
    let app = create_test_app(manager).await;

    let req = test::TestRequest::get()
        .uri("/static/app.js")
        .cookie(Cookie::new(SESSION_COOKIE, UNKNOWN_SESSION_ID))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri("/profile")
        .cookie(Cookie::new(SESSION_COOKIE, UNKNOWN_SESSION_ID))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp).as_deref(), Some(LOGIN_URL));
}

#[actix_web::test]
async fn test_failing_store_rejects_login() {
    let manager = manager_with(&settings(StoreFailurePolicy::FailClosed), Arc::new(FailingStore));
    let app = create_test_app(manager).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/authc/login")
        .set_json(serde_json::json!({ "username": "admin", "password": "admin" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[actix_web::test]
async fn test_slow_store_times_out() {
    let mut settings = settings(StoreFailurePolicy::FailClosed);
    settings.session.lookup_timeout_ms = 50;
    let store = Arc::new(SlowStore {
        inner: MemorySessionStore::new(),
        delay: Duration::from_secs(5),
    });
    let app = create_test_app(manager_with(&settings, store)).await;

    // Saving is fast, so login works; the lookup afterwards stalls.
    let cookie = login_cookie(&app, "admin", "admin").await;

    let req = test::TestRequest::get()
        .uri("/profile")
        .cookie(cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(location(&resp).as_deref(), Some(LOGIN_URL));
}

// =============================================================================
// Reject
// =============================================================================

#[actix_web::test]
async fn test_reject_policy_answers_503() {
    let manager = manager_with(&settings(StoreFailurePolicy::Reject), Arc::new(FailingStore));
    let app = create_test_app(manager).await;

    let req = test::TestRequest::get()
        .uri("/static/app.js")
        .cookie(Cookie::new(SESSION_COOKIE, UNKNOWN_SESSION_ID))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[actix_web::test]
async fn test_reject_policy_without_cookie_skips_store() {
    let manager = manager_with(&settings(StoreFailurePolicy::Reject), Arc::new(FailingStore));
    let app = create_test_app(manager).await;

    let req = test::TestRequest::get().uri("/static/app.js").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::get().uri("/profile").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(location(&resp).as_deref(), Some(LOGIN_URL));
}

// =============================================================================
// Redirect Mode
// =============================================================================

#[actix_web::test]
async fn test_status_redirect_mode() {
    let settings = SecuritySettings {
        redirect_mode: RedirectMode::Status,
        ..test_settings()
    };
    let app = create_test_app(manager_with(&settings, Arc::new(MemorySessionStore::new()))).await;

    let req = test::TestRequest::get().uri("/profile").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(location(&resp).as_deref(), Some(LOGIN_URL));

    let cookie = login_cookie(&app, "guest", "guest").await;
    let req = test::TestRequest::get()
        .uri("/admin/dashboard")
        .cookie(cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(location(&resp).as_deref(), Some(UNAUTHORIZED_URL));
}
