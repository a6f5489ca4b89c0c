//! Filter chain tests.
//!
//! URL pattern authorization through the middleware: ordering, anonymous
//! access, redirects, role and permission rules, expiry and logout.


use std::sync::Arc;
use std::time::Duration;

use actix_web::cookie::Cookie;
use actix_web::http::StatusCode;
use actix_web::test;

use actix_gatekeeper_core::http::security::{MemorySessionStore, Session, SessionStore, User};

use common::{
    create_test_app, location, login_cookie, manager_with, settings_with_chain, test_manager,
    LOGIN_URL, SESSION_COOKIE, UNAUTHORIZED_URL, UNKNOWN_SESSION_ID,
};

// =============================================================================
// Anonymous Access
// =============================================================================

#[actix_web::test]
async fn test_static_resources_without_session() {
    let app = create_test_app(test_manager()).await;

    for uri in ["/static/app.js", "/static/css/site/main.css"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK, "{}", uri);
    }
}

#[actix_web::test]
async fn test_root_is_anonymous() {
    let app = create_test_app(test_manager()).await;

    let req = test::TestRequest::get().uri("/").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = test::read_body(resp).await;
    assert_eq!(body, "Welcome, guest!");
}

#[actix_web::test]
async fn test_login_endpoints_are_anonymous() {
    let app = create_test_app(test_manager()).await;

    let req = test::TestRequest::get().uri(LOGIN_URL).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(location(&resp).is_none());
}

// =============================================================================
// Authentication Redirects
// =============================================================================

#[actix_web::test]
async fn test_admin_without_session_redirects_to_login() {
    let app = create_test_app(test_manager()).await;

    let req = test::TestRequest::get().uri("/admin/dashboard").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp).as_deref(), Some(LOGIN_URL));
}

#[actix_web::test]
async fn test_catch_all_requires_session() {
    let app = create_test_app(test_manager()).await;

    for uri in ["/profile", "/anything/else", "/admin"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FOUND, "{}", uri);
        assert_eq!(location(&resp).as_deref(), Some(LOGIN_URL), "{}", uri);
    }
}

#[actix_web::test]
async fn test_unknown_session_is_anonymous() {
    let app = create_test_app(test_manager()).await;

    for id in [UNKNOWN_SESSION_ID, "not a valid id!", ""] {
        let req = test::TestRequest::get()
            .uri("/profile")
            .cookie(Cookie::new(SESSION_COOKIE, id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(location(&resp).as_deref(), Some(LOGIN_URL), "{:?}", id);
    }
}

#[actix_web::test]
async fn test_expired_session_is_like_no_session() {
    let store = Arc::new(MemorySessionStore::new());
    let manager = manager_with(&common::test_settings(), store.clone());
    let app = create_test_app(manager).await;

    let user = User::new("admin").roles(&["admin".into()]);
    let expired = Session::new(user, Duration::from_secs(60)).last_accessed_at(0);
    store.save(&expired, Duration::from_secs(60)).await.unwrap();

    let with_expired = test::TestRequest::get()
        .uri("/admin/dashboard")
        .cookie(Cookie::new(SESSION_COOKIE, expired.id().to_string()))
        .to_request();
    let resp = test::call_service(&app, with_expired).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp).as_deref(), Some(LOGIN_URL));

    // The expired record is gone afterwards.
    assert!(store.load(expired.id()).await.unwrap().is_none());
}

// =============================================================================
// Roles and Permissions
// =============================================================================

#[actix_web::test]
async fn test_admin_role_granted() {
    let app = create_test_app(test_manager()).await;
    let cookie = login_cookie(&app, "admin", "admin").await;

    let req = test::TestRequest::get()
        .uri("/admin/dashboard")
        .cookie(cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = test::read_body(resp).await;
    assert_eq!(body, "Admin: admin");
}

#[actix_web::test]
async fn test_missing_role_redirects_to_unauthorized() {
    let app = create_test_app(test_manager()).await;
    let cookie = login_cookie(&app, "user", "user").await;

    let req = test::TestRequest::get()
        .uri("/admin/dashboard")
        .cookie(cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp).as_deref(), Some(UNAUTHORIZED_URL));
}

#[actix_web::test]
async fn test_permission_rule() {
    let app = create_test_app(test_manager()).await;

    let user = login_cookie(&app, "user", "user").await;
    let req = test::TestRequest::get()
        .uri("/reports/summary")
        .cookie(user)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let guest = login_cookie(&app, "guest", "guest").await;
    let req = test::TestRequest::get()
        .uri("/reports/summary")
        .cookie(guest)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(location(&resp).as_deref(), Some(UNAUTHORIZED_URL));
}

#[actix_web::test]
async fn test_percent_encoded_path_uses_routed_entry() {
    let app = create_test_app(test_manager()).await;
    let guest = login_cookie(&app, "guest", "guest").await;

    for uri in ["/admin/dashboard", "/%61dmin/dashboard", "/%61%64%6D%69%6E/dashboard"] {
        let req = test::TestRequest::get()
            .uri(uri)
            .cookie(guest.clone())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FOUND, "{}", uri);
        assert_eq!(location(&resp).as_deref(), Some(UNAUTHORIZED_URL), "{}", uri);
    }

    let admin = login_cookie(&app, "admin", "admin").await;
    let req = test::TestRequest::get()
        .uri("/%61dmin/dashboard")
        .cookie(admin)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(test::read_body(resp).await, "Admin: admin");
}

#[actix_web::test]
async fn test_handler_permission_check_is_forbidden() {
    let app = create_test_app(test_manager()).await;

    // `report:read` passes the chain entry; the handler also wants `report:write`.
    let user = login_cookie(&app, "user", "user").await;
    let req = test::TestRequest::get()
        .uri("/reports/export")
        .cookie(user)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let admin = login_cookie(&app, "admin", "admin").await;
    let req = test::TestRequest::get()
        .uri("/reports/export")
        .cookie(admin)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

// =============================================================================
// Ordering
// =============================================================================

#[actix_web::test]
async fn test_first_match_wins() {
    // `/admin/**` is reached before `/**`, so a plain session is not enough.
    let app = create_test_app(test_manager()).await;
    let cookie = login_cookie(&app, "guest", "guest").await;

    let req = test::TestRequest::get()
        .uri("/profile")
        .cookie(cookie.clone())
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri("/admin/dashboard")
        .cookie(cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(location(&resp).as_deref(), Some(UNAUTHORIZED_URL));
}

#[actix_web::test]
async fn test_anon_after_catch_all_has_no_effect() {
    let shadowed = settings_with_chain(&[
        ("/api/v1/authc/**", "anon"),
        ("/**", "authc"),
        ("/static/**", "anon"),
    ]);
    let app = create_test_app(manager_with(&shadowed, Arc::new(MemorySessionStore::new()))).await;

    let req = test::TestRequest::get().uri("/static/app.js").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp).as_deref(), Some(LOGIN_URL));

    let ordered = settings_with_chain(&[
        ("/api/v1/authc/**", "anon"),
        ("/static/**", "anon"),
        ("/**", "authc"),
    ]);
    let app = create_test_app(manager_with(&ordered, Arc::new(MemorySessionStore::new()))).await;

    let req = test::TestRequest::get().uri("/static/app.js").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_unmatched_path_is_denied() {
    let settings = settings_with_chain(&[("/static/**", "anon"), ("/api/v1/authc/**", "anon")]);
    let app = create_test_app(manager_with(&settings, Arc::new(MemorySessionStore::new()))).await;

    let req = test::TestRequest::get().uri("/profile").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(location(&resp).as_deref(), Some(LOGIN_URL));

    let cookie = login_cookie(&app, "admin", "admin").await;
    let req = test::TestRequest::get()
        .uri("/profile")
        .cookie(cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(location(&resp).as_deref(), Some(UNAUTHORIZED_URL));
}

// =============================================================================
// Logout
// =============================================================================

#[actix_web::test]
async fn test_logout_ends_session() {
    let app = create_test_app(test_manager()).await;
    let cookie = login_cookie(&app, "admin", "admin").await;

    let req = test::TestRequest::get()
        .uri("/logout")
        .cookie(cookie.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp).as_deref(), Some("/"));

    let removal = resp
        .response()
        .cookies()
        .find(|c| c.name() == SESSION_COOKIE)
        .map(|c| c.into_owned())
        .unwrap();
    assert_eq!(removal.value(), "");

    let req = test::TestRequest::get()
        .uri("/profile")
        .cookie(cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(location(&resp).as_deref(), Some(LOGIN_URL));
}

#[actix_web::test]
async fn test_logout_without_session() {
    let app = create_test_app(test_manager()).await;

    let req = test::TestRequest::get().uri("/logout").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp).as_deref(), Some("/"));
}
