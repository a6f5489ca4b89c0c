//! Session id cookie.

use actix_web::cookie::{time, Cookie, SameSite};

use super::Session;

/// Default session cookie name.
pub const DEFAULT_COOKIE_NAME: &str = "GKSESSIONID";

/// How the session id travels to and from the browser.
///
/// The cookie carries only the id; everything else stays in the store.
/// It has no `Max-Age` by default, so it lives for the browser session
/// while the server enforces the idle timeout.
#[derive(Debug, Clone)]
pub struct SessionCookie {
    name: String,
    path: String,
    secure: bool,
    http_only: bool,
    same_site: SameSite,
}

impl Default for SessionCookie {
    fn default() -> Self {
        Self::new(DEFAULT_COOKIE_NAME)
    }
}

impl SessionCookie {
    pub fn new(name: &str) -> Self {
        SessionCookie {
            name: name.to_string(),
            path: "/".to_string(),
            secure: false,
            http_only: true,
            same_site: SameSite::Lax,
        }
    }

    pub fn path(mut self, path: &str) -> Self {
        self.path = path.to_string();
        self
    }

    /// Only send the cookie over HTTPS.
    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn same_site(mut self, same_site: SameSite) -> Self {
        self.same_site = same_site;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Cookie that hands `session`'s id to the client.
    pub fn build(&self, session: &Session) -> Cookie<'static> {
        Cookie::build(self.name.clone(), session.id().to_string())
            .path(self.path.clone())
            .secure(self.secure)
            .http_only(self.http_only)
            .same_site(self.same_site)
            .finish()
    }

    /// Cookie that tells the client to drop the session id.
    pub fn removal(&self) -> Cookie<'static> {
        Cookie::build(self.name.clone(), "")
            .path(self.path.clone())
            .secure(self.secure)
            .http_only(self.http_only)
            .same_site(self.same_site)
            .max_age(time::Duration::ZERO)
            .finish()
    }
}
