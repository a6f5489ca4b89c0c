//! HTTP security: filter chain, sessions, middleware and errors.

pub mod error;
pub mod security;
