//! The interceptor seam between the middleware and access rules.

use actix_web::http::StatusCode;

use crate::http::security::subject::Subject;

/// Why a request was turned away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    /// No valid session; the caller must log in.
    Unauthenticated,
    /// Logged in, but without the required roles or permissions.
    Unauthorized,
}

impl Denial {
    /// Status used when redirects are rendered as plain status responses.
    pub fn status(&self) -> StatusCode {
        match self {
            Denial::Unauthenticated => StatusCode::UNAUTHORIZED,
            Denial::Unauthorized => StatusCode::FORBIDDEN,
        }
    }
}

/// Outcome of [`AccessInterceptor::authorize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Redirect { location: String, denial: Denial },
    /// End the caller's session, then send them to `location`.
    Logout { location: String },
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }
}

/// Decides what happens to a request before it reaches a handler.
///
/// Implementations must be cheap and side-effect free: they are called
/// concurrently for every request and never touch the session store.
///
/// # Shiro Equivalent
/// `PathMatchingFilterChainResolver` plus the `AccessControlFilter`s it selects
pub trait AccessInterceptor: Send + Sync {
    fn authorize(&self, path: &str, subject: &Subject) -> Decision;
}
