//! Route handlers organized by access level.

pub mod admin;
pub mod authc;
pub mod public;
