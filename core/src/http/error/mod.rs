//! Error types.
//!
//! - [`ConfigError`]: fatal at startup, the process should not serve traffic.
//! - [`AuthError`]: a single login or request failed authentication or authorization.
//! - [`SecurityError`]: the middleware could not reach a decision for a request.

mod auth_error;
mod config_error;
mod security_error;

pub use auth_error::AuthError;
pub use config_error::ConfigError;
pub use security_error::SecurityError;
