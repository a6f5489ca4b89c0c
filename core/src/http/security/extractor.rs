//! Extractors for accessing the security context in handlers.
//!
//! The middleware places the [`User`] and [`Session`] of an authenticated
//! caller in the request extensions; these types read them back.
//!
//! # Shiro Equivalent
//! `SecurityUtils.getSubject()`

use std::future::{ready, Ready};
use std::ops::Deref;

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpMessage, HttpRequest};

use crate::http::error::AuthError;
use crate::http::security::session::Session;
use crate::http::security::User;

/// Extractor for the authenticated user.
///
/// # Usage
/// ```ignore
/// use actix_gatekeeper_core::http::security::AuthenticatedUser;
///
/// async fn handler(user: AuthenticatedUser) -> impl Responder {
///     format!("Hello, {}!", user.get_username())
/// }
/// ```
///
/// # Errors
/// Returns `401 Unauthorized` if the user is not authenticated.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(User);

impl AuthenticatedUser {
    pub fn new(user: User) -> Self {
        AuthenticatedUser(user)
    }

    pub fn into_inner(self) -> User {
        self.0
    }
}

impl Deref for AuthenticatedUser {
    type Target = User;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = AuthError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<User>().cloned() {
            Some(user) => ready(Ok(AuthenticatedUser(user))),
            None => ready(Err(AuthError::Unauthorized)),
        }
    }
}

/// Optional extractor for the authenticated user.
///
/// Returns `None` if not authenticated instead of an error.
#[derive(Debug, Clone)]
pub struct OptionalUser(Option<User>);

impl OptionalUser {
    pub fn into_inner(self) -> Option<User> {
        self.0
    }

    pub fn is_authenticated(&self) -> bool {
        self.0.is_some()
    }
}

impl Deref for OptionalUser {
    type Target = Option<User>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequest for OptionalUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let user = req.extensions().get::<User>().cloned();
        ready(Ok(OptionalUser(user)))
    }
}

/// Extractor for the caller's session, e.g. to log it out.
///
/// # Errors
/// Returns `401 Unauthorized` if there is no active session.
#[derive(Debug, Clone)]
pub struct CurrentSession(Session);

impl CurrentSession {
    pub fn into_inner(self) -> Session {
        self.0
    }
}

impl Deref for CurrentSession {
    type Target = Session;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequest for CurrentSession {
    type Error = AuthError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<Session>().cloned() {
            Some(session) => ready(Ok(CurrentSession(session))),
            None => ready(Err(AuthError::Unauthorized)),
        }
    }
}

/// Extension trait for HttpRequest to check authorization inside handlers.
pub trait SecurityExt {
    fn get_user(&self) -> Option<User>;

    fn is_authenticated(&self) -> bool;

    fn has_role(&self, role: &str) -> bool;

    fn has_any_role(&self, roles: &[&str]) -> bool;

    /// Checks a wildcard permission such as `user:delete`.
    fn is_permitted(&self, permission: &str) -> bool;

    /// The current user if they hold `role`.
    ///
    /// [`AuthError::Unauthorized`] without a user, [`AuthError::Forbidden`]
    /// when the role is missing.
    fn require_role(&self, role: &str) -> Result<User, AuthError>;

    /// The current user if they are permitted `permission`.
    fn require_permission(&self, permission: &str) -> Result<User, AuthError>;
}

impl SecurityExt for HttpRequest {
    fn get_user(&self) -> Option<User> {
        self.extensions().get::<User>().cloned()
    }

    fn is_authenticated(&self) -> bool {
        self.extensions().get::<User>().is_some()
    }

    fn has_role(&self, role: &str) -> bool {
        self.extensions()
            .get::<User>()
            .is_some_and(|u| u.has_role(role))
    }

    fn has_any_role(&self, roles: &[&str]) -> bool {
        self.extensions()
            .get::<User>()
            .is_some_and(|u| u.has_any_role(roles))
    }

    fn is_permitted(&self, permission: &str) -> bool {
        self.extensions()
            .get::<User>()
            .is_some_and(|u| u.is_permitted(permission))
    }

    fn require_role(&self, role: &str) -> Result<User, AuthError> {
        let user = self.get_user().ok_or(AuthError::Unauthorized)?;
        if user.has_role(role) {
            Ok(user)
        } else {
            Err(AuthError::Forbidden)
        }
    }

    fn require_permission(&self, permission: &str) -> Result<User, AuthError> {
        let user = self.get_user().ok_or(AuthError::Unauthorized)?;
        if user.is_permitted(permission) {
            Ok(user)
        } else {
            Err(AuthError::Forbidden)
        }
    }
}
