//! Ordered URL filter chain.
//!
//! A chain is a list of `(pattern, rules)` definitions. For every request
//! the definitions are scanned in declaration order and the **first**
//! pattern that matches the path decides; later definitions are never
//! consulted. Paths that match no pattern are denied.
//!
//! # Rules
//!
//! | Rule | Meaning |
//! |------|---------|
//! | `anon` | Allow without a session |
//! | `authc` | Require a valid session |
//! | `roles[a,b]` | Require a session whose user has every listed role |
//! | `perms[x:y,z]` | Require a session whose user is permitted every listed permission |
//! | `logout` | End the session and redirect |
//!
//! Several rules can be combined for one pattern (`"authc, roles[admin]"`);
//! they run left to right and the first denial wins.
//!
//! # Ordering
//!
//! A catch-all such as `/**` shadows everything declared after it, so it
//! must come last. The builder logs a warning for shadowed definitions but
//! keeps the declared order.
//!
//! # Example
//! ```
//! use actix_gatekeeper_core::http::security::{
//!     AccessInterceptor, Decision, FilterChain, Subject,
//! };
//!
//! let chain = FilterChain::builder()
//!     .login_url("/login")
//!     .unauthorized_url("/unauthorized")
//!     .definition("/static/**", "anon")
//!     .definition("/**", "authc")
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(chain.authorize("/static/app.js", &Subject::Anonymous), Decision::Allow);
//! assert!(!chain.authorize("/admin", &Subject::Anonymous).is_allowed());
//! ```
//!
//! # Shiro Equivalent
//! `ShiroFilterFactoryBean.setFilterChainDefinitionMap(LinkedHashMap)`

use std::collections::HashSet;
use std::fmt;

use log::{debug, warn};

use crate::http::error::ConfigError;
use crate::http::security::ant_matcher::AntMatcher;
use crate::http::security::config::{AccessInterceptor, Decision, Denial};
use crate::http::security::subject::Subject;

/// A single access rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    Anon,
    Authc,
    Roles(Vec<String>),
    Perms(Vec<String>),
    Logout,
}

impl Rule {
    /// Parses a comma-separated rule list such as `"authc, roles[admin,ops]"`.
    fn parse_list(pattern: &str, definition: &str) -> Result<Vec<Rule>, ConfigError> {
        let rules = split_top_level(pattern, definition)?
            .into_iter()
            .map(|token| Rule::parse(pattern, token))
            .collect::<Result<Vec<_>, _>>()?;

        let standalone = rules
            .iter()
            .find(|rule| matches!(rule, Rule::Anon | Rule::Logout));
        if let (Some(rule), true) = (standalone, rules.len() > 1) {
            return Err(ConfigError::InvalidRule {
                pattern: pattern.to_string(),
                rule: definition.to_string(),
                reason: format!("`{}` cannot be combined with other rules", rule),
            });
        }

        Ok(rules)
    }

    fn parse(pattern: &str, token: &str) -> Result<Rule, ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidRule {
            pattern: pattern.to_string(),
            rule: token.to_string(),
            reason: reason.to_string(),
        };

        let (name, args) = match token.find('[') {
            Some(open) => {
                let inner = token[open + 1..]
                    .strip_suffix(']')
                    .ok_or_else(|| invalid("missing closing `]`"))?;
                let args: Vec<String> = inner
                    .split(',')
                    .map(|arg| arg.trim().to_string())
                    .collect();
                if args.iter().any(String::is_empty) {
                    return Err(invalid("empty argument"));
                }
                (token[..open].trim(), Some(args))
            }
            None => (token, None),
        };

        match (name, args) {
            ("anon", None) => Ok(Rule::Anon),
            ("authc", None) => Ok(Rule::Authc),
            ("logout", None) => Ok(Rule::Logout),
            ("roles", Some(args)) => Ok(Rule::Roles(args)),
            ("perms", Some(args)) => Ok(Rule::Perms(args)),
            ("anon" | "authc" | "logout", Some(_)) => Err(invalid("rule takes no arguments")),
            ("roles" | "perms", None) => Err(invalid("rule requires `[...]` arguments")),
            _ => Err(invalid("unknown rule")),
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Anon => write!(f, "anon"),
            Rule::Authc => write!(f, "authc"),
            Rule::Roles(roles) => write!(f, "roles[{}]", roles.join(",")),
            Rule::Perms(perms) => write!(f, "perms[{}]", perms.join(",")),
            Rule::Logout => write!(f, "logout"),
        }
    }
}

/// Splits on commas that are not inside `[...]`.
fn split_top_level<'a>(pattern: &str, definition: &'a str) -> Result<Vec<&'a str>, ConfigError> {
    let unbalanced = || ConfigError::InvalidRule {
        pattern: pattern.to_string(),
        rule: definition.to_string(),
        reason: "unbalanced brackets".to_string(),
    };

    let mut tokens = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in definition.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => depth = depth.checked_sub(1).ok_or_else(unbalanced)?,
            ',' if depth == 0 => {
                tokens.push(definition[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(unbalanced());
    }
    tokens.push(definition[start..].trim());

    if tokens.iter().any(|token| token.is_empty()) {
        return Err(ConfigError::InvalidRule {
            pattern: pattern.to_string(),
            rule: definition.to_string(),
            reason: "empty rule".to_string(),
        });
    }
    Ok(tokens)
}

/// One compiled `(pattern, rules)` definition.
#[derive(Debug, Clone)]
pub struct ChainEntry {
    matcher: AntMatcher,
    rules: Vec<Rule>,
}

impl ChainEntry {
    pub fn pattern(&self) -> &str {
        self.matcher.pattern()
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }
}

/// Immutable, ordered filter chain.
///
/// Built once at startup and shared read-only across requests.
#[derive(Debug, Clone)]
pub struct FilterChain {
    entries: Vec<ChainEntry>,
    login_url: String,
    unauthorized_url: String,
    logout_redirect_url: String,
    case_insensitive: bool,
}

impl FilterChain {
    pub fn builder() -> FilterChainBuilder {
        FilterChainBuilder::new()
    }

    /// Returns the first entry whose pattern matches `path`.
    pub fn resolve(&self, path: &str) -> Option<&ChainEntry> {
        self.entries.iter().find(|entry| entry.matcher.matches(path))
    }

    pub fn entries(&self) -> &[ChainEntry] {
        &self.entries
    }

    pub fn login_url(&self) -> &str {
        &self.login_url
    }

    pub fn unauthorized_url(&self) -> &str {
        &self.unauthorized_url
    }

    pub fn logout_redirect_url(&self) -> &str {
        &self.logout_redirect_url
    }

    fn to_login(&self) -> Decision {
        Decision::Redirect {
            location: self.login_url.clone(),
            denial: Denial::Unauthenticated,
        }
    }

    fn to_unauthorized(&self) -> Decision {
        Decision::Redirect {
            location: self.unauthorized_url.clone(),
            denial: Denial::Unauthorized,
        }
    }

    /// Compares path segments the way [`AntMatcher::matches`] does, so
    /// `/login/` and `//login` are the login URL too.
    fn is_login_path(&self, path: &str) -> bool {
        fn segments(path: &str) -> Vec<&str> {
            path.split('/').filter(|s| !s.is_empty()).collect()
        }
        let (path, login) = (segments(path), segments(&self.login_url));
        path.len() == login.len()
            && path.iter().zip(&login).all(|(a, b)| {
                if self.case_insensitive {
                    a.eq_ignore_ascii_case(b)
                } else {
                    a == b
                }
            })
    }

    fn evaluate(&self, rules: &[Rule], path: &str, subject: &Subject) -> Decision {
        // The login page itself stays reachable, otherwise an `authc`,
        // `roles` or `perms` catch-all would redirect it to itself.
        if !rules.contains(&Rule::Logout) && self.is_login_path(path) {
            return Decision::Allow;
        }

        for rule in rules {
            match rule {
                Rule::Anon => return Decision::Allow,
                Rule::Logout => {
                    return Decision::Logout {
                        location: self.logout_redirect_url.clone(),
                    }
                }
                Rule::Authc => {
                    if !subject.is_authenticated() {
                        return self.to_login();
                    }
                }
                Rule::Roles(roles) => match subject.user() {
                    None => return self.to_login(),
                    Some(user) if !user.has_all_roles(roles.as_slice()) => return self.to_unauthorized(),
                    Some(_) => {}
                },
                Rule::Perms(perms) => match subject.user() {
                    None => return self.to_login(),
                    Some(user) if !user.is_permitted_all(perms.as_slice()) => return self.to_unauthorized(),
                    Some(_) => {}
                },
            }
        }
        Decision::Allow
    }
}

impl AccessInterceptor for FilterChain {
    fn authorize(&self, path: &str, subject: &Subject) -> Decision {
        match self.resolve(path) {
            Some(entry) => {
                let decision = self.evaluate(&entry.rules, path, subject);
                debug!(
                    "{} matched `{}` -> {:?}",
                    path,
                    entry.pattern(),
                    decision
                );
                decision
            }
            None => {
                debug!("{} matched no filter chain entry, denying", path);
                if subject.is_authenticated() {
                    self.to_unauthorized()
                } else {
                    self.to_login()
                }
            }
        }
    }
}

/// Builder for [`FilterChain`].
///
/// Definitions keep their insertion order. Nothing is validated until
/// [`build`](FilterChainBuilder::build).
#[derive(Debug, Clone)]
pub struct FilterChainBuilder {
    definitions: Vec<(String, String)>,
    login_url: String,
    unauthorized_url: String,
    logout_redirect_url: String,
    case_insensitive: bool,
}

impl FilterChainBuilder {
    pub fn new() -> Self {
        FilterChainBuilder {
            definitions: Vec::new(),
            login_url: "/login".to_string(),
            unauthorized_url: "/unauthorized".to_string(),
            logout_redirect_url: "/".to_string(),
            case_insensitive: false,
        }
    }

    /// Appends a `(pattern, rules)` definition.
    pub fn definition(mut self, pattern: &str, rules: &str) -> Self {
        self.definitions.push((pattern.to_string(), rules.to_string()));
        self
    }

    /// Appends several definitions in order.
    pub fn definitions<I, P, R>(mut self, definitions: I) -> Self
    where
        I: IntoIterator<Item = (P, R)>,
        P: Into<String>,
        R: Into<String>,
    {
        self.definitions
            .extend(definitions.into_iter().map(|(p, r)| (p.into(), r.into())));
        self
    }

    /// Where unauthenticated requests are sent (default `/login`).
    pub fn login_url(mut self, url: &str) -> Self {
        self.login_url = url.to_string();
        self
    }

    /// Where authenticated but unprivileged requests are sent (default `/unauthorized`).
    pub fn unauthorized_url(mut self, url: &str) -> Self {
        self.unauthorized_url = url.to_string();
        self
    }

    /// Where `logout` sends the caller afterwards (default `/`).
    pub fn logout_redirect_url(mut self, url: &str) -> Self {
        self.logout_redirect_url = url.to_string();
        self
    }

    /// Match paths ignoring ASCII case.
    pub fn case_insensitive(mut self, case_insensitive: bool) -> Self {
        self.case_insensitive = case_insensitive;
        self
    }

    /// Compiles and validates every definition.
    ///
    /// # Errors
    /// Any malformed pattern, unknown or malformed rule, duplicate pattern, or
    /// empty redirect URL.
    pub fn build(self) -> Result<FilterChain, ConfigError> {
        for (field, url) in [
            ("login_url", &self.login_url),
            ("unauthorized_url", &self.unauthorized_url),
            ("logout_redirect_url", &self.logout_redirect_url),
        ] {
            if url.trim().is_empty() {
                return Err(ConfigError::invalid_setting(field, "must not be empty"));
            }
        }

        let mut seen = HashSet::new();
        let mut entries = Vec::with_capacity(self.definitions.len());
        let mut catch_all: Option<String> = None;

        for (pattern, definition) in &self.definitions {
            if !seen.insert(pattern.as_str()) {
                return Err(ConfigError::DuplicatePattern {
                    pattern: pattern.clone(),
                });
            }

            let mut matcher = AntMatcher::new(pattern)?;
            if self.case_insensitive {
                matcher = matcher.case_insensitive();
            }
            let rules = Rule::parse_list(pattern, definition)?;

            if let Some(shadowing) = &catch_all {
                warn!(
                    "filter chain entry `{}` is unreachable: `{}` is declared before it",
                    pattern, shadowing
                );
            } else if matcher.is_catch_all() {
                catch_all = Some(pattern.clone());
            }

            entries.push(ChainEntry { matcher, rules });
        }

        Ok(FilterChain {
            entries,
            login_url: self.login_url,
            unauthorized_url: self.unauthorized_url,
            logout_redirect_url: self.logout_redirect_url,
            case_insensitive: self.case_insensitive,
        })
    }
}

impl Default for FilterChainBuilder {
    fn default() -> Self {
        Self::new()
    }
}
