use actix_web::{error, http::StatusCode, HttpResponse, HttpResponseBuilder};
use derive_more::{Display, Error};

/// Per-request failures raised by the security middleware.
///
/// Only produced when the manager is configured with
/// [`StoreFailurePolicy::Reject`](crate::http::security::StoreFailurePolicy::Reject);
/// the default fail-closed policy downgrades store failures to an anonymous subject.
#[derive(Debug, Display, Error)]
pub enum SecurityError {
    #[display("session store unavailable: {reason}")]
    SessionStoreUnavailable { reason: String },
}

impl error::ResponseError for SecurityError {
    fn status_code(&self) -> StatusCode {
        match *self {
            SecurityError::SessionStoreUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn error_response(&self) -> HttpResponse {
        // The reason stays in the logs; clients only see the status.
        HttpResponseBuilder::new(self.status_code()).body("service unavailable")
    }
}
