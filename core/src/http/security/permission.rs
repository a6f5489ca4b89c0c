//! Wildcard permissions.
//!
//! A permission string is split into parts on `:` and each part into
//! alternatives on `,`. A `*` part matches anything, and a granted
//! permission with fewer parts implies every more specific one:
//!
//! | granted | requested | implied |
//! |---------|-----------|---------|
//! | `user:*` | `user:delete` | yes |
//! | `user` | `user:read:42` | yes |
//! | `user:read,write` | `user:write` | yes |
//! | `user:read` | `user:write` | no |
//! | `user:read:42` | `user:read` | no |
//!
//! Comparison is case-insensitive.
//!
//! # Shiro Equivalent
//! `org.apache.shiro.authz.permission.WildcardPermission`

use std::collections::BTreeSet;

const WILDCARD: &str = "*";

/// A parsed wildcard permission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WildcardPermission {
    parts: Vec<BTreeSet<String>>,
}

impl WildcardPermission {
    /// Parses a permission string. Empty parts and alternatives are dropped.
    pub fn parse(permission: &str) -> Self {
        let parts = permission
            .split(':')
            .map(|part| {
                part.split(',')
                    .map(|alt| alt.trim().to_lowercase())
                    .filter(|alt| !alt.is_empty())
                    .collect::<BTreeSet<_>>()
            })
            .filter(|part| !part.is_empty())
            .collect();
        Self { parts }
    }

    /// Returns true if holding `self` grants `other`.
    pub fn implies(&self, other: &WildcardPermission) -> bool {
        if self.parts.is_empty() {
            return false;
        }

        for (i, requested) in other.parts.iter().enumerate() {
            match self.parts.get(i) {
                // Shorter grants imply everything below them.
                None => return true,
                Some(granted) => {
                    if !granted.contains(WILDCARD) && !granted.is_superset(requested) {
                        return false;
                    }
                }
            }
        }

        self.parts
            .iter()
            .skip(other.parts.len())
            .all(|granted| granted.contains(WILDCARD))
    }
}
