//! Login endpoints under `/api/v1/authc`, reachable without a session.

use actix_web::{get, post, web, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::json;

use actix_gatekeeper_core::http::error::AuthError;
use actix_gatekeeper_core::http::security::SecurityManager;

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Verifies the credentials and hands out the session cookie.
#[post("/api/v1/authc/login")]
pub async fn login(
    manager: web::Data<SecurityManager>,
    form: web::Json<LoginForm>,
) -> Result<HttpResponse, AuthError> {
    let session = manager.login(&form.username, &form.password).await?;
    Ok(HttpResponse::Ok()
        .cookie(manager.session_cookie().build(&session))
        .json(json!({
            "username": session.user().get_username(),
            "roles": session.user().get_roles(),
        })))
}

/// Where unauthenticated requests are redirected.
#[get("/api/v1/authc/nologin")]
pub async fn nologin() -> impl Responder {
    HttpResponse::Unauthorized().json(json!({ "code": 401, "message": "not logged in" }))
}

/// Where authenticated but unauthorized requests are redirected.
#[get("/api/v1/authc/unauthorized")]
pub async fn unauthorized() -> impl Responder {
    HttpResponse::Forbidden().json(json!({ "code": 403, "message": "permission denied" }))
}
