//! Match rules gating per-language and per-file behavior.

use std::path::Path;

use regex::Regex;
use serde::Deserialize;

/// A rule evaluated against a language identifier or a file path.
///
/// Deserialized from the shapes accepted in the settings file:
///
/// - `true` / `false` → [`Policy::Always`] / [`Policy::Never`]
/// - `"text"` → [`Policy::Contains`] (substring match)
/// - `{ "pattern": "^fr" }` → [`Policy::Matches`]
/// - `[ ... ]` → [`Policy::AnyOf`]
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "PolicySpec")]
pub enum Policy {
    Always,
    Never,
    Contains(String),
    Matches(Regex),
    AnyOf(Vec<Policy>),
}

impl Policy {
    /// Evaluates the policy against `subject`.
    #[must_use]
    pub fn matches(&self, subject: &str) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Contains(needle) => subject.contains(needle.as_str()),
            Self::Matches(pattern) => pattern.is_match(subject),
            Self::AnyOf(policies) => policies.iter().any(|policy| policy.matches(subject)),
        }
    }

    /// Evaluates the policy against the display form of `path`.
    #[must_use]
    pub fn matches_path(&self, path: &Path) -> bool {
        self.matches(&path.to_string_lossy())
    }

    /// Builds a [`Policy::Matches`] from a regular expression.
    ///
    /// # Errors
    /// Returns the regex compile error for an invalid pattern.
    pub fn pattern(pattern: &str) -> Result<Self, regex::Error> {
        Regex::new(pattern).map(Self::Matches)
    }
}

impl From<bool> for Policy {
    fn from(flag: bool) -> Self {
        if flag { Self::Always } else { Self::Never }
    }
}

/// Raw settings-file shape of a [`Policy`].
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PolicySpec {
    /// `true` / `false`
    Flag(bool),
    /// Substring
    Text(String),
    /// Regular expression
    Pattern {
        /// Regex source
        pattern: String,
    },
    /// Any of the nested rules
    List(Vec<PolicySpec>),
}

/// Raised when a `{ "pattern": ... }` policy does not compile.
#[derive(thiserror::Error, Debug)]
#[error("invalid policy pattern '{pattern}': {source}")]
pub struct InvalidPolicy {
    /// Offending pattern source
    pattern: String,
    /// Compile error
    #[source]
    source: regex::Error,
}

impl TryFrom<PolicySpec> for Policy {
    type Error = InvalidPolicy;

    fn try_from(spec: PolicySpec) -> Result<Self, Self::Error> {
        match spec {
            PolicySpec::Flag(flag) => Ok(Self::from(flag)),
            PolicySpec::Text(needle) => Ok(Self::Contains(needle)),
            PolicySpec::Pattern { pattern } => {
                Self::pattern(&pattern).map_err(|source| InvalidPolicy { pattern, source })
            }
            PolicySpec::List(specs) => {
                specs.into_iter().map(Self::try_from).collect::<Result<Vec<_>, _>>().map(Self::AnyOf)
            }
        }
    }
}
