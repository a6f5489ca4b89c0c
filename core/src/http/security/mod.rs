//! URL-pattern security for Actix Web.
//!
//! # Shiro Equivalent
//! `org.apache.shiro.web` with a `ShiroFilterFactoryBean` filter chain
//!
//! # Module Structure
//!
//! - `ant_matcher` - Ant-style URL pattern matching
//! - `filter_chain` - Ordered `pattern -> rules` chain (anon, authc, roles, perms, logout)
//! - `config` - Core trait (AccessInterceptor) and its Decision
//! - `subject` - Anonymous or authenticated caller
//! - `session` - Sessions, session stores (memory, Redis), session cookie
//! - `crypto` - Credentials matching (salted, iterated SHA-2)
//! - `realm` - Account lookup (MemoryRealm)
//! - `permission` - Wildcard permissions
//! - `manager` - SecurityManager tying everything together
//! - `middleware` - Security middleware (SecurityTransform)
//! - `extractor` - Actix Web extractors (AuthenticatedUser, OptionalUser, CurrentSession)
//! - `settings` - TOML configuration
//! - `user` - User model
//!
//! # Feature Flags
//! - `redis-store` (default): Enables `RedisSessionStore`

// Re-exports for convenience
pub use ant_matcher::AntMatcher;
pub use config::{AccessInterceptor, Decision, Denial};
pub use crypto::{
    CredentialsMatcher, HashAlgorithm, HashedCredentialsMatcher, SimpleCredentialsMatcher,
};
pub use extractor::{AuthenticatedUser, CurrentSession, OptionalUser, SecurityExt};
pub use filter_chain::{ChainEntry, FilterChain, FilterChainBuilder, Rule};
pub use manager::{RedirectMode, SecurityManager, SecurityManagerBuilder, StoreFailurePolicy};
pub use middleware::SecurityTransform;
pub use permission::WildcardPermission;
pub use realm::{Account, MemoryRealm, Realm, RealmError};
#[cfg(feature = "redis-store")]
pub use session::RedisSessionStore;
pub use session::{
    MemorySessionStore, Session, SessionCookie, SessionError, SessionLookup, SessionManager,
    SessionStore,
};
pub use settings::{ChainDefinition, CredentialsSettings, SecuritySettings, SessionSettings};
pub use subject::Subject;
pub use user::User;

// Internal modules (private implementation details)
mod config;
mod extractor;
mod subject;
mod user;

// Public modules
pub mod ant_matcher;
pub mod crypto;
pub mod filter_chain;
pub mod manager;
pub mod middleware;
pub mod permission;
pub mod realm;
pub mod session;
pub mod settings;
