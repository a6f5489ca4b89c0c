use actix_web::{error, http::StatusCode, HttpResponse, HttpResponseBuilder};
use derive_more::{Display, Error};

/// Authentication and authorization failures.
///
/// Unknown accounts and wrong passwords share [`AuthError::InvalidCredentials`]
/// so that responses do not reveal which usernames exist.
#[derive(Debug, Display, Error)]
pub enum AuthError {
    #[display("invalid credentials")]
    InvalidCredentials,
    #[display("account is locked")]
    AccountLocked,
    #[display("authentication required")]
    Unauthorized,
    #[display("forbidden")]
    Forbidden,
    #[display("identity provider unavailable")]
    RealmUnavailable,
    #[display("session store unavailable")]
    SessionUnavailable,
}

impl error::ResponseError for AuthError {
    fn status_code(&self) -> StatusCode {
        match *self {
            AuthError::InvalidCredentials
            | AuthError::AccountLocked
            | AuthError::Unauthorized => StatusCode::UNAUTHORIZED,
            AuthError::Forbidden => StatusCode::FORBIDDEN,
            AuthError::RealmUnavailable | AuthError::SessionUnavailable => {
                StatusCode::SERVICE_UNAVAILABLE
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponseBuilder::new(self.status_code()).body(self.to_string())
    }
}
