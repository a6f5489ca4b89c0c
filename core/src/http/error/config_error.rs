use derive_more::{Display, Error};

/// Startup configuration errors.
///
/// Every variant is fatal: building a filter chain, credentials matcher or
/// security manager from a bad configuration returns one of these and the
/// host should refuse to start.
#[derive(Debug, Display, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[display("invalid pattern `{pattern}`: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[display("invalid rule `{rule}` for pattern `{pattern}`: {reason}")]
    InvalidRule {
        pattern: String,
        rule: String,
        reason: String,
    },

    #[display("pattern `{pattern}` is defined more than once")]
    DuplicatePattern { pattern: String },

    #[display("unsupported hash algorithm `{name}`")]
    UnsupportedHashAlgorithm { name: String },

    #[display("invalid setting `{field}`: {reason}")]
    InvalidSetting { field: String, reason: String },

    #[display("security manager is missing its {component}")]
    MissingComponent { component: &'static str },

    #[display("could not load settings: {reason}")]
    Settings { reason: String },
}

impl ConfigError {
    pub(crate) fn invalid_pattern(pattern: &str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_setting(field: &str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidSetting {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}
