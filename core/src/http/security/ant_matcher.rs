//! Ant-style path patterns.
//!
//! # Pattern Syntax
//!
//! - `?` matches exactly one character
//! - `*` matches zero or more characters within a path segment
//! - `**` matches zero or more path segments (must be a whole segment)
//! - `{name}` matches exactly one path segment
//!
//! Patterns are validated when they are built. A malformed pattern is a
//! [`ConfigError`], so a bad filter chain is rejected at startup instead of
//! silently never matching.
//!
//! # Examples
//!
//! ```rust
//! use actix_gatekeeper_core::http::security::ant_matcher::AntMatcher;
//!
//! let matcher = AntMatcher::new("/static/**").unwrap();
//! assert!(matcher.matches("/static/css/site.css"));
//! assert!(!matcher.matches("/admin"));
//!
//! assert!(AntMatcher::new("static/**").is_err());
//! assert!(AntMatcher::new("/files/a**").is_err());
//! ```
//!
//! # Shiro Equivalent
//!
//! `org.apache.shiro.util.AntPathMatcher`

use crate::http::error::ConfigError;

/// A validated Ant-style pattern.
#[derive(Debug, Clone)]
pub struct AntMatcher {
    pattern: String,
    segments: Vec<Segment>,
    case_sensitive: bool,
}

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    /// Pattern `/`, matches only the root path.
    Root,
    Literal(String),
    /// `*` or `{name}`: exactly one segment.
    AnySegment,
    /// `**`
    AnySegments,
    /// Segment containing `*` or `?` among other characters.
    Glob(Vec<char>),
}

impl AntMatcher {
    /// Parses and validates a pattern.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidPattern`] when the pattern is empty, does
    /// not start with `/`, contains whitespace, uses `**` inside a segment, or
    /// has an unbalanced or empty `{}` variable.
    pub fn new(pattern: &str) -> Result<Self, ConfigError> {
        let segments = parse(pattern)?;
        Ok(Self {
            pattern: pattern.to_string(),
            segments,
            case_sensitive: true,
        })
    }

    /// Makes literal and glob comparisons ignore ASCII case.
    pub fn case_insensitive(mut self) -> Self {
        self.case_sensitive = false;
        self
    }

    /// The pattern string as written in the configuration.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// True for patterns that match every path, such as `/**`.
    ///
    /// Entries declared after a catch-all can never be reached.
    pub fn is_catch_all(&self) -> bool {
        !self.segments.is_empty()
            && self
                .segments
                .iter()
                .all(|segment| *segment == Segment::AnySegments)
    }

    /// Checks whether `path` matches this pattern.
    ///
    /// Empty segments are ignored, so `/api/users/` and `/api//users`
    /// both match `/api/users`. The cost is bounded by the number of
    /// pattern segments times the number of path segments, whatever
    /// wildcards the pattern holds.
    pub fn matches(&self, path: &str) -> bool {
        let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let n = parts.len();

        // reached[j]: the pattern segments seen so far match `parts[..j]`.
        let mut reached = vec![false; n + 1];
        reached[0] = true;

        for segment in &self.segments {
            let mut next = vec![false; n + 1];
            match segment {
                Segment::Root => next[0] = reached[0],
                Segment::AnySegments => {
                    let mut any = false;
                    for j in 0..=n {
                        any |= reached[j];
                        next[j] = any;
                    }
                }
                Segment::AnySegment => {
                    for j in 1..=n {
                        next[j] = reached[j - 1];
                    }
                }
                Segment::Literal(literal) => {
                    for j in 1..=n {
                        next[j] = reached[j - 1] && self.eq_literal(literal, parts[j - 1]);
                    }
                }
                Segment::Glob(glob) => {
                    for j in 1..=n {
                        if reached[j - 1] {
                            let text: Vec<char> = parts[j - 1].chars().collect();
                            next[j] = self.match_glob(glob, &text);
                        }
                    }
                }
            }
            if !next.contains(&true) {
                return false;
            }
            reached = next;
        }

        reached[n]
    }

    fn eq_literal(&self, literal: &str, part: &str) -> bool {
        if self.case_sensitive {
            literal == part
        } else {
            literal.eq_ignore_ascii_case(part)
        }
    }

    /// Single-segment glob match. On a mismatch only the most recent `*`
    /// is widened, which keeps the work linear in practice.
    fn match_glob(&self, glob: &[char], text: &[char]) -> bool {
        let (mut g, mut t) = (0, 0);
        let mut star: Option<(usize, usize)> = None;

        while t < text.len() {
            match glob.get(g).copied() {
                Some('*') => {
                    star = Some((g, t));
                    g += 1;
                }
                Some('?') => {
                    g += 1;
                    t += 1;
                }
                Some(c) if self.eq_char(c, text[t]) => {
                    g += 1;
                    t += 1;
                }
                _ => match star {
                    Some((star_g, star_t)) => {
                        g = star_g + 1;
                        t = star_t + 1;
                        star = Some((star_g, star_t + 1));
                    }
                    None => return false,
                },
            }
        }

        glob[g..].iter().all(|c| *c == '*')
    }

    fn eq_char(&self, a: char, b: char) -> bool {
        if self.case_sensitive {
            a == b
        } else {
            a.eq_ignore_ascii_case(&b)
        }
    }
}

fn parse(pattern: &str) -> Result<Vec<Segment>, ConfigError> {
    if pattern.is_empty() {
        return Err(ConfigError::invalid_pattern(pattern, "pattern is empty"));
    }
    if !pattern.starts_with('/') {
        return Err(ConfigError::invalid_pattern(pattern, "pattern must start with `/`"));
    }
    if pattern.chars().any(char::is_whitespace) {
        return Err(ConfigError::invalid_pattern(pattern, "pattern contains whitespace"));
    }

    let parts: Vec<&str> = pattern.split('/').filter(|s| !s.is_empty()).collect();
    if parts.is_empty() {
        return Ok(vec![Segment::Root]);
    }

    parts
        .into_iter()
        .map(|part| parse_segment(pattern, part))
        .collect()
}

fn parse_segment(pattern: &str, part: &str) -> Result<Segment, ConfigError> {
    if part == "**" {
        return Ok(Segment::AnySegments);
    }
    if part.contains("**") {
        return Err(ConfigError::invalid_pattern(
            pattern,
            format!("`**` must be a whole path segment, found `{}`", part),
        ));
    }
    if part == "*" {
        return Ok(Segment::AnySegment);
    }
    if part.contains('{') || part.contains('}') {
        let name = part
            .strip_prefix('{')
            .and_then(|rest| rest.strip_suffix('}'))
            .ok_or_else(|| {
                ConfigError::invalid_pattern(
                    pattern,
                    format!("unbalanced variable braces in `{}`", part),
                )
            })?;
        if name.is_empty() || name.contains('{') || name.contains('}') {
            return Err(ConfigError::invalid_pattern(
                pattern,
                format!("invalid variable name in `{}`", part),
            ));
        }
        return Ok(Segment::AnySegment);
    }
    if part.contains('*') || part.contains('?') {
        return Ok(Segment::Glob(part.chars().collect()));
    }
    Ok(Segment::Literal(part.to_string()))
}
