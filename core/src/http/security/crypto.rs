//! Credential hashing and comparison.
//!
//! # Hash format
//!
//! [`HashedCredentialsMatcher`] stores credentials as lowercase hex of
//!
//! ```text
//! h(1) = H(salt || password)
//! h(n) = H(h(n - 1))          for n in 2..=iterations
//! ```
//!
//! where `H` is the configured SHA-2 variant. Accounts without a salt hash
//! the bare password.
//!
//! # Shiro Equivalent
//! `HashedCredentialsMatcher` / `SimpleHash`

use std::fmt;
use std::str::FromStr;

use sha2::{Digest, Sha256, Sha384, Sha512};
use subtle::ConstantTimeEq;

use crate::http::error::ConfigError;
use crate::http::security::realm::Account;

/// Default iteration count.
pub const DEFAULT_HASH_ITERATIONS: u32 = 1024;

/// Compares submitted credentials with an account's stored ones.
pub trait CredentialsMatcher: Send + Sync {
    fn matches(&self, submitted: &str, account: &Account) -> bool;
}

/// Supported digest algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HashAlgorithm {
    #[default]
    Sha256,
    Sha384,
    Sha512,
}

impl HashAlgorithm {
    /// Canonical name, as accepted by [`FromStr`].
    pub fn name(&self) -> &'static str {
        match self {
            HashAlgorithm::Sha256 => "SHA-256",
            HashAlgorithm::Sha384 => "SHA-384",
            HashAlgorithm::Sha512 => "SHA-512",
        }
    }

    fn hash(&self, salt: &[u8], password: &[u8], iterations: u32) -> Vec<u8> {
        match self {
            HashAlgorithm::Sha256 => iterate::<Sha256>(salt, password, iterations),
            HashAlgorithm::Sha384 => iterate::<Sha384>(salt, password, iterations),
            HashAlgorithm::Sha512 => iterate::<Sha512>(salt, password, iterations),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HashAlgorithm {
    type Err = ConfigError;

    /// Accepts `SHA-256`, `sha256`, `Sha-512` and so on.
    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let normalized: String = name
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "sha256" => Ok(HashAlgorithm::Sha256),
            "sha384" => Ok(HashAlgorithm::Sha384),
            "sha512" => Ok(HashAlgorithm::Sha512),
            _ => Err(ConfigError::UnsupportedHashAlgorithm {
                name: name.to_string(),
            }),
        }
    }
}

fn iterate<D: Digest>(salt: &[u8], password: &[u8], iterations: u32) -> Vec<u8> {
    let mut hasher = D::new();
    hasher.update(salt);
    hasher.update(password);
    let mut hashed = hasher.finalize().to_vec();
    for _ in 1..iterations {
        hashed = D::digest(&hashed).to_vec();
    }
    hashed
}

/// Salted, iterated hash comparison.
///
/// # Example
/// ```
/// use actix_gatekeeper_core::http::security::{Account, CredentialsMatcher, HashedCredentialsMatcher};
///
/// let matcher = HashedCredentialsMatcher::from_name("SHA-256", 1024).unwrap();
/// let account = Account::new("admin", matcher.hash("secret", Some("pepper")))
///     .salt("pepper");
///
/// assert!(matcher.matches("secret", &account));
/// assert!(!matcher.matches("guess", &account));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashedCredentialsMatcher {
    algorithm: HashAlgorithm,
    iterations: u32,
}

impl HashedCredentialsMatcher {
    /// # Errors
    /// `iterations` must be at least 1.
    pub fn new(algorithm: HashAlgorithm, iterations: u32) -> Result<Self, ConfigError> {
        if iterations == 0 {
            return Err(ConfigError::invalid_setting(
                "credentials.iterations",
                "must be at least 1",
            ));
        }
        Ok(Self {
            algorithm,
            iterations,
        })
    }

    /// Builds a matcher from an algorithm name such as `"SHA-256"`.
    pub fn from_name(algorithm: &str, iterations: u32) -> Result<Self, ConfigError> {
        Self::new(algorithm.parse()?, iterations)
    }

    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Hashes a password into the stored hex form.
    pub fn hash(&self, password: &str, salt: Option<&str>) -> String {
        let salt = salt.unwrap_or_default().as_bytes();
        hex::encode(self.algorithm.hash(salt, password.as_bytes(), self.iterations))
    }
}

impl Default for HashedCredentialsMatcher {
    fn default() -> Self {
        Self {
            algorithm: HashAlgorithm::default(),
            iterations: DEFAULT_HASH_ITERATIONS,
        }
    }
}

impl CredentialsMatcher for HashedCredentialsMatcher {
    fn matches(&self, submitted: &str, account: &Account) -> bool {
        let stored = account.get_credentials().to_ascii_lowercase();
        let computed = self.hash(submitted, account.get_salt());
        computed.as_bytes().ct_eq(stored.as_bytes()).into()
    }
}

/// Compares plain-text credentials.
///
/// # Warning
/// Only for tests and local development: credentials are stored as is.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleCredentialsMatcher;

impl CredentialsMatcher for SimpleCredentialsMatcher {
    fn matches(&self, submitted: &str, account: &Account) -> bool {
        submitted
            .as_bytes()
            .ct_eq(account.get_credentials().as_bytes())
            .into()
    }
}
