//! Run-scoped upstream tag snapshot.
//!
//! A [`TagCatalog`] is constructed once per run from the upstream's raw tag
//! listing and shared by every release line for the rest of the run. Even a
//! long run never re-reads the tag list — an intentional consistency
//! snapshot. Tests construct catalogs directly from token vectors; nothing
//! here is ambient or global.

use crate::error::TagError;
use crate::types::{ReleaseLine, Tag, PRERELEASE_MARKER};

/// Immutable snapshot of every raw tag token the upstream reported.
///
/// Token order is whatever the source returned; matching sorts its results,
/// so nothing downstream depends on the raw order.
#[derive(Debug, Clone)]
pub struct TagCatalog {
    tokens: Vec<String>,
}

impl TagCatalog {
    pub fn new(tokens: Vec<String>) -> Self {
        Self { tokens }
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Candidate tags for a release line, sorted ascending by version key and
    /// deduplicated.
    ///
    /// A token is a candidate iff it starts with the line's tag prefix
    /// (`"5.4.x"` → `"v5.4."`) and does not contain the prerelease marker.
    /// A matching-prefix token that fails tag parsing propagates
    /// [`TagError::Malformed`] — never skipped, since a single unparseable
    /// candidate would poison the ordering of the whole line.
    pub fn matching(&self, line: &ReleaseLine) -> Result<Vec<Tag>, TagError> {
        let prefix = line.tag_prefix();

        let mut tags = Vec::new();
        for token in &self.tokens {
            if !token.starts_with(&prefix) || token.contains(PRERELEASE_MARKER) {
                continue;
            }
            tags.push(Tag::parse(token)?);
        }

        tags.sort();
        tags.dedup_by(|a, b| a.key() == b.key());
        Ok(tags)
    }
}
