//! Domain types for upstream release tags and tracked release lines.
//!
//! Tag ordering is always by parsed version key (numeric, component-wise),
//! never by token string. A `Tag` cannot be constructed without a valid key,
//! so every `Tag` in the system is comparable.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TagError;

/// Fixed one-character prefix every upstream release token carries.
pub const TAG_PREFIX: char = 'v';

/// Substring identifying a candidate/non-final tag. Tokens containing it are
/// never candidates for mirroring.
pub const PRERELEASE_MARKER: &str = "rc";

// ---------------------------------------------------------------------------
// ReleaseLine
// ---------------------------------------------------------------------------

/// A tracked upstream version family, identified by a wildcard pattern
/// (e.g. `"5.4.x"`). Configured at process start, immutable thereafter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReleaseLine(pub String);

impl ReleaseLine {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The token prefix a tag must carry to belong to this line:
    /// `"5.4.x"` → `"v5.4."`.
    pub fn tag_prefix(&self) -> String {
        let base = self.0.strip_suffix(".x").unwrap_or(&self.0);
        format!("{TAG_PREFIX}{base}.")
    }
}

impl fmt::Display for ReleaseLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ReleaseLine {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ReleaseLine {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Tag
// ---------------------------------------------------------------------------

/// An upstream release identifier: a `v`-prefixed dotted sequence of
/// non-negative integers, e.g. `v5.4.10`.
///
/// Carries both the raw token (for display, checkouts, and checkpoint files)
/// and the parsed version key (for ordering).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tag {
    token: String,
    key: Vec<u64>,
}

impl Tag {
    /// Parse a raw tag token.
    ///
    /// Fails with [`TagError::Malformed`] when the prefix is absent or any
    /// dotted component is not an integer. This is a hard precondition —
    /// ordering correctness depends on every candidate tag parsing cleanly.
    pub fn parse(token: &str) -> Result<Self, TagError> {
        let Some(version) = token.strip_prefix(TAG_PREFIX) else {
            return Err(TagError::Malformed {
                token: token.to_string(),
                reason: format!("missing '{TAG_PREFIX}' prefix"),
            });
        };
        if version.is_empty() {
            return Err(TagError::Malformed {
                token: token.to_string(),
                reason: "empty version".to_string(),
            });
        }

        let mut key = Vec::new();
        for component in version.split('.') {
            let n: u64 = component.parse().map_err(|_| TagError::Malformed {
                token: token.to_string(),
                reason: format!("non-numeric component '{component}'"),
            })?;
            key.push(n);
        }

        Ok(Self {
            token: token.to_string(),
            key,
        })
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// The parsed version key: `v5.4.10` → `[5, 4, 10]`.
    pub fn key(&self) -> &[u64] {
        &self.key
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.token.fmt(f)
    }
}

impl Ord for Tag {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key
            .cmp(&other.key)
            .then_with(|| self.token.cmp(&other.token))
    }
}

impl PartialOrd for Tag {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
