//! Dotted hierarchical identifiers
//!
//! An [`Identifier`] names a namespace (`Company.Billing.Domain`) and, by
//! convention, the folder that holds its files (`Company/Billing/Domain`).

use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{RestructuringError, Result};

/// A dotted, non-empty namespace name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identifier(String);

impl Identifier {
    /// Parse an identifier, rejecting empty names and empty segments
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let trimmed = name.trim();

        if trimmed.is_empty() {
            return Err(RestructuringError::InvalidIdentifier(
                "Identifier cannot be empty".to_string(),
            ));
        }

        for segment in trimmed.split('.') {
            if segment.is_empty() {
                return Err(RestructuringError::InvalidIdentifier(format!(
                    "'{}' contains an empty segment",
                    trimmed
                )));
            }
            if !segment.chars().all(|c| c.is_alphanumeric() || c == '_') {
                return Err(RestructuringError::InvalidIdentifier(format!(
                    "'{}' contains invalid characters in segment '{}'",
                    trimmed, segment
                )));
            }
        }

        Ok(Self(trimmed.to_string()))
    }

    /// Build an identifier from a folder path relative to the codebase root
    pub fn from_relative_dir(dir: &Path) -> Option<Self> {
        let mut segments = Vec::new();
        for component in dir.components() {
            match component {
                Component::Normal(part) => segments.push(part.to_str()?.to_string()),
                Component::CurDir => {}
                _ => return None,
            }
        }
        if segments.is_empty() {
            return None;
        }
        Self::new(segments.join(".")).ok()
    }

    /// The identifier as written
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Segments from outermost to innermost
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.')
    }

    /// Number of segments
    pub fn depth(&self) -> usize {
        self.segments().count()
    }

    /// Innermost segment
    pub fn last_segment(&self) -> &str {
        self.0.rsplit('.').next().unwrap_or(&self.0)
    }

    /// Enclosing identifier, if any
    pub fn parent(&self) -> Option<Identifier> {
        self.0
            .rsplit_once('.')
            .map(|(parent, _)| Identifier(parent.to_string()))
    }

    /// Nested identifier `self.segment`
    pub fn child(&self, segment: &str) -> Result<Identifier> {
        Identifier::new(format!("{}.{}", self.0, segment.trim()))
    }

    /// True when `self` equals `prefix` or lives underneath it (segment-wise)
    pub fn is_within(&self, prefix: &Identifier) -> bool {
        self.0 == prefix.0
            || (self.0.len() > prefix.0.len()
                && self.0.starts_with(&prefix.0)
                && self.0.as_bytes()[prefix.0.len()] == b'.')
    }

    /// Replace the `from` prefix with `to`; `None` when `self` is not within `from`
    pub fn rebase(&self, from: &Identifier, to: &Identifier) -> Option<Identifier> {
        if !self.is_within(from) {
            return None;
        }
        Some(Identifier(format!("{}{}", to.0, &self.0[from.0.len()..])))
    }

    /// Folder path for this identifier (`A.B.C` -> `A/B/C`)
    pub fn to_relative_path(&self) -> PathBuf {
        self.segments().collect()
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Identifier {
    type Err = RestructuringError;

    fn from_str(s: &str) -> Result<Self> {
        Identifier::new(s)
    }
}

impl TryFrom<String> for Identifier {
    type Error = RestructuringError;

    fn try_from(value: String) -> Result<Self> {
        Identifier::new(value)
    }
}

impl From<Identifier> for String {
    fn from(value: Identifier) -> Self {
        value.0
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
