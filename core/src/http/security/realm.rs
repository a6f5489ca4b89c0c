//! Identity lookup.
//!
//! # Shiro Equivalent
//! `AuthorizingRealm` / `SimpleAccount`

use std::collections::HashMap;

use async_trait::async_trait;
use derive_more::{Display, Error};
use log::warn;

use crate::http::security::user::User;

/// A stored account: credentials plus authorization data.
///
/// # Example
/// ```
/// use actix_gatekeeper_core::http::security::Account;
///
/// let account = Account::new("admin", "5e88...hex")
///     .salt("a1b2c3")
///     .roles(&["admin".into()])
///     .permissions(&["user:*".into()]);
///
/// assert_eq!(account.to_user().get_username(), "admin");
/// ```
#[derive(Clone, Debug)]
pub struct Account {
    username: String,
    credentials: String,
    salt: Option<String>,
    roles: Vec<String>,
    permissions: Vec<String>,
    locked: bool,
}

impl Account {
    /// Creates an account with already-hashed credentials.
    pub fn new(username: impl Into<String>, credentials: impl Into<String>) -> Self {
        Account {
            username: username.into(),
            credentials: credentials.into(),
            salt: None,
            roles: Vec::new(),
            permissions: Vec::new(),
            locked: false,
        }
    }

    pub fn salt(mut self, salt: &str) -> Self {
        self.salt = Some(salt.to_string());
        self
    }

    pub fn roles(mut self, roles: &[String]) -> Self {
        for role in roles {
            if !self.roles.contains(role) {
                self.roles.push(role.clone());
            }
        }
        self
    }

    pub fn permissions(mut self, permissions: &[String]) -> Self {
        for permission in permissions {
            if !self.permissions.contains(permission) {
                self.permissions.push(permission.clone());
            }
        }
        self
    }

    /// Locked accounts never authenticate.
    pub fn locked(mut self, locked: bool) -> Self {
        self.locked = locked;
        self
    }

    pub fn get_username(&self) -> &str {
        &self.username
    }

    pub fn get_credentials(&self) -> &str {
        &self.credentials
    }

    pub fn get_salt(&self) -> Option<&str> {
        self.salt.as_deref()
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// The principal stored in a session once this account logs in.
    pub fn to_user(&self) -> User {
        User::new(self.username.clone())
            .roles(&self.roles)
            .permissions(&self.permissions)
    }
}

/// Identity lookup failures.
#[derive(Debug, Display, Error)]
pub enum RealmError {
    #[display("realm `{realm}` unavailable: {reason}")]
    Unavailable { realm: String, reason: String },
}

/// Looks up accounts by username.
///
/// Realms only find accounts; comparing credentials is the job of a
/// [`CredentialsMatcher`](crate::http::security::CredentialsMatcher).
#[async_trait]
pub trait Realm: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Returns `Ok(None)` when no such account exists.
    async fn find_account(&self, username: &str) -> Result<Option<Account>, RealmError>;
}

/// Realm holding accounts in memory.
///
/// # Example
/// ```
/// use actix_gatekeeper_core::http::security::{Account, MemoryRealm};
///
/// let realm = MemoryRealm::new()
///     .with_account(Account::new("admin", "hash").roles(&["admin".into()]));
/// ```
#[derive(Clone, Debug)]
pub struct MemoryRealm {
    name: String,
    accounts: HashMap<String, Account>,
}

impl MemoryRealm {
    pub fn new() -> Self {
        Self::named("memory")
    }

    pub fn named(name: &str) -> Self {
        MemoryRealm {
            name: name.to_string(),
            accounts: HashMap::new(),
        }
    }

    /// Adds an account. Duplicate usernames keep the first account.
    pub fn with_account(mut self, account: Account) -> Self {
        use std::collections::hash_map::Entry;
        match self.accounts.entry(account.get_username().to_string()) {
            Entry::Occupied(e) => {
                warn!("account {} already exists in realm {}, skipping", e.key(), self.name);
            }
            Entry::Vacant(e) => {
                e.insert(account);
            }
        }
        self
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

impl Default for MemoryRealm {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Realm for MemoryRealm {
    fn name(&self) -> &str {
        &self.name
    }

    async fn find_account(&self, username: &str) -> Result<Option<Account>, RealmError> {
        Ok(self.accounts.get(username).cloned())
    }
}
