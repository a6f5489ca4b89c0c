//! Anonymous routes.

use actix_web::{get, web, HttpResponse, Responder};

use actix_gatekeeper_core::http::security::OptionalUser;

/// Landing page; greets the user when a session is present.
#[get("/")]
pub async fn index(user: OptionalUser) -> impl Responder {
    match user.into_inner() {
        Some(u) => HttpResponse::Ok().body(format!("Welcome back, {}!", u.get_username())),
        None => HttpResponse::Ok().body("Welcome, guest!"),
    }
}

#[get("/static/{file:.*}")]
pub async fn static_file(file: web::Path<String>) -> impl Responder {
    HttpResponse::Ok().body(format!("static: {}", file.into_inner()))
}
