//! The per-request view of the caller.

use crate::http::security::session::Session;
use crate::http::security::user::User;

/// Who is making the current request.
#[derive(Debug, Clone)]
pub enum Subject {
    Anonymous,
    Authenticated(Session),
}

impl Subject {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Subject::Authenticated(_))
    }

    pub fn session(&self) -> Option<&Session> {
        match self {
            Subject::Authenticated(session) => Some(session),
            Subject::Anonymous => None,
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.session().map(Session::user)
    }
}
