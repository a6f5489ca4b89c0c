//! Authenticated principal.
//!
//! # Shiro Equivalent
//! `PrincipalCollection` together with the `AuthorizationInfo` a realm returns

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::http::security::permission::WildcardPermission;

/// The identity that owns a session.
///
/// Holds no credentials; it is what gets stored in the session cache and
/// placed in request extensions for handlers.
///
/// # Example
/// ```
/// use actix_gatekeeper_core::http::security::User;
///
/// let user = User::new("admin")
///     .roles(&["admin".into()])
///     .permissions(&["user:*".into()]);
///
/// assert!(user.has_role("admin"));
/// assert!(user.is_permitted("user:delete"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    username: String,
    #[serde(default)]
    roles: Vec<String>,
    #[serde(default)]
    permissions: Vec<String>,
}

impl User {
    pub fn new(username: impl Into<String>) -> Self {
        User {
            username: username.into(),
            roles: Vec::new(),
            permissions: Vec::new(),
        }
    }

    pub fn get_username(&self) -> &str {
        &self.username
    }

    pub fn get_roles(&self) -> &[String] {
        &self.roles
    }

    pub fn get_permissions(&self) -> &[String] {
        &self.permissions
    }

    /// Adds roles, skipping duplicates.
    pub fn roles(mut self, roles: &[String]) -> Self {
        for role in roles {
            if !self.roles.contains(role) {
                self.roles.push(role.clone());
            }
        }
        self
    }

    /// Adds permission strings, skipping duplicates.
    pub fn permissions(mut self, permissions: &[String]) -> Self {
        for permission in permissions {
            if !self.permissions.contains(permission) {
                self.permissions.push(permission.clone());
            }
        }
        self
    }

    /// Role names are compared exactly.
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    pub fn has_any_role<S: AsRef<str>>(&self, roles: &[S]) -> bool {
        roles.iter().any(|role| self.has_role(role.as_ref()))
    }

    pub fn has_all_roles<S: AsRef<str>>(&self, roles: &[S]) -> bool {
        roles.iter().all(|role| self.has_role(role.as_ref()))
    }

    /// Checks a permission against the granted wildcard permissions.
    pub fn is_permitted(&self, permission: &str) -> bool {
        let requested = WildcardPermission::parse(permission);
        self.permissions
            .iter()
            .any(|granted| WildcardPermission::parse(granted).implies(&requested))
    }

    pub fn is_permitted_all<S: AsRef<str>>(&self, permissions: &[S]) -> bool {
        permissions
            .iter()
            .all(|permission| self.is_permitted(permission.as_ref()))
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "User {{ username: {}, roles: {:?}, permissions: {:?} }}",
            self.username, self.roles, self.permissions
        )
    }
}
