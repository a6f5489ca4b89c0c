//! # Actix Gatekeeper Core
//!
//! URL filter chain security for Actix Web.
//!
//! The crate wires four collaborators into one explicitly constructed
//! [`SecurityManager`](http::security::SecurityManager):
//!
//! - an ordered filter chain of Ant-style patterns where the first match wins,
//! - a [`Realm`](http::security::Realm) that looks up accounts,
//! - a [`CredentialsMatcher`](http::security::CredentialsMatcher) that compares
//!   salted, iterated hashes,
//! - a [`SessionManager`](http::security::SessionManager) on top of a
//!   cache-backed [`SessionStore`](http::security::SessionStore).
//!
//! The manager is shared with the [`SecurityTransform`](http::security::middleware::SecurityTransform)
//! middleware through an `Arc`; there is no process-global state.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `redis-store` | Yes | `RedisSessionStore` backed by the `redis` crate |

pub mod http;
