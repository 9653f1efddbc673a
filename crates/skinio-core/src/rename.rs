//! Influence rename rules.

use std::borrow::Cow;

use regex::Regex;

use crate::error::{SkinError, SkinResult};

/// A single `(pattern, replacement)` substitution applied to influence names.
///
/// The pattern is a regular expression; every match is replaced. The
/// replacement may reference capture groups as `$1` or `${name}`.
#[derive(Debug, Clone)]
pub struct RenameRule {
    pattern: Regex,
    replacement: String,
}

impl RenameRule {
    /// Compiles a rename rule.
    pub fn new(pattern: &str, replacement: impl Into<String>) -> SkinResult<Self> {
        let pattern = Regex::new(pattern).map_err(SkinError::InvalidRenameRule)?;
        Ok(Self {
            pattern,
            replacement: replacement.into(),
        })
    }

    /// The source pattern.
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// The replacement text.
    pub fn replacement(&self) -> &str {
        &self.replacement
    }

    /// Applies the rule to `name`.
    pub fn apply<'a>(&self, name: &'a str) -> Cow<'a, str> {
        self.pattern.replace_all(name, self.replacement.as_str())
    }
}
