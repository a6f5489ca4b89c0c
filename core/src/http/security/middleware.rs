//! Security middleware for Actix Web.
//!
//! Every request is resolved to a [`Subject`] from the session cookie, the
//! filter chain decides, and the decision is carried out before the inner
//! service sees the request.
//!
//! The chain sees the percent-decoded path the router matches on, so
//! `/%61dmin/dashboard` is checked against the same entry as
//! `/admin/dashboard`.
//!
//! # Shiro Equivalent
//! `ShiroFilterFactoryBean` / `AbstractShiroFilter`

use std::rc::Rc;
use std::sync::Arc;

use actix_service::{Service, Transform};
use actix_web::body::EitherBody;
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::http::header;
use actix_web::{Error, HttpMessage, HttpResponse};
use futures_util::future::{ok, LocalBoxFuture, Ready};
use log::{debug, warn};

use crate::http::security::config::Decision;
use crate::http::security::manager::SecurityManager;
use crate::http::security::subject::Subject;

/// Security middleware factory.
///
/// # Example
/// ```ignore
/// let manager = Arc::new(SecurityManager::from_settings(&settings, realm, store)?);
///
/// App::new()
///     .app_data(web::Data::from(manager.clone()))
///     .wrap(SecurityTransform::new(manager.clone()))
/// ```
pub struct SecurityTransform {
    manager: Arc<SecurityManager>,
}

impl SecurityTransform {
    pub fn new(manager: Arc<SecurityManager>) -> Self {
        SecurityTransform { manager }
    }
}

impl<S, B> Transform<S, ServiceRequest> for SecurityTransform
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = SecurityService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(SecurityService {
            manager: Arc::clone(&self.manager),
            service: Rc::new(service),
        })
    }
}

/// Security middleware service.
pub struct SecurityService<S> {
    manager: Arc<SecurityManager>,
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for SecurityService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    actix_web::dev::forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let manager = Arc::clone(&self.manager);

        Box::pin(async move {
            let session_id = req
                .cookie(manager.session_cookie().name())
                .map(|cookie| cookie.value().to_string());

            let subject = match manager.resolve_subject(session_id.as_deref()).await {
                Ok(subject) => subject,
                Err(err) => return Ok(req.error_response(err).map_into_right_body()),
            };

            if let Subject::Authenticated(session) = &subject {
                let mut extensions = req.extensions_mut();
                extensions.insert(session.user().clone());
                extensions.insert(session.clone());
            }

            // `match_info` holds the decoded path used for routing; the raw
            // `req.path()` can differ from it.
            let path = req.match_info().as_str().to_owned();

            match manager.authorize(&path, &subject) {
                Decision::Allow => {
                    let res = service.call(req).await?;
                    Ok(res.map_into_left_body())
                }
                Decision::Redirect { location, denial } => {
                    debug!("{} {} denied, redirecting to {}", req.method(), path, location);
                    let response = manager.redirect_response(&location, denial);
                    Ok(req.into_response(response).map_into_right_body())
                }
                Decision::Logout { location } => {
                    if let Some(session) = subject.session() {
                        if let Err(err) = manager.logout(session.id()).await {
                            warn!("logout could not remove session: {}", err);
                        }
                    }
                    let response = HttpResponse::Found()
                        .cookie(manager.session_cookie().removal())
                        .append_header((header::LOCATION, location))
                        .finish();
                    Ok(req.into_response(response).map_into_right_body())
                }
            }
        })
    }
}
