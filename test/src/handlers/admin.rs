//! Routes guarded by `roles[...]` and `perms[...]` chain entries.

use actix_web::{get, HttpRequest, HttpResponse, Responder};

use actix_gatekeeper_core::http::error::AuthError;
use actix_gatekeeper_core::http::security::{AuthenticatedUser, SecurityExt};

/// `/admin/** = authc, roles[admin]`
#[get("/admin/dashboard")]
pub async fn admin_dashboard(user: AuthenticatedUser) -> impl Responder {
    HttpResponse::Ok().body(format!(
        "Admin Dashboard\n\nWelcome, {}!",
        user.get_username()
    ))
}

/// `/reports/** = perms[report:read]`
#[get("/reports/summary")]
pub async fn report_summary(req: HttpRequest, user: AuthenticatedUser) -> impl Responder {
    let editable = req.is_permitted("report:write");
    HttpResponse::Ok().body(format!(
        "Report summary for {} (editable: {})",
        user.get_username(),
        editable
    ))
}

/// Matched by `/reports/**` too; exporting additionally needs `report:write`.
#[get("/reports/export")]
pub async fn report_export(req: HttpRequest) -> Result<HttpResponse, AuthError> {
    let user = req.require_permission("report:write")?;
    Ok(HttpResponse::Ok().body(format!("Report export for {}", user.get_username())))
}
