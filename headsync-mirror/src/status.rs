//! Read-only per-line mirror status.
//!
//! Classifies each configured line against the same catalog + checkpoint +
//! resolver path the pipeline uses, without mutating anything.

use std::path::Path;

use headsync_core::{catalog::TagCatalog, checkpoint, range, MirrorConfig, ReleaseLine, Tag};

use crate::error::MirrorError;
use crate::upstream::Upstream;

/// Where a release line stands relative to upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineStatus {
    /// No final upstream tags exist for this line.
    NoTags,
    /// No checkpoint yet; the full candidate history is outstanding.
    NeverMirrored { latest: Tag, missing: usize },
    /// Checkpoint trails the catalog maximum.
    Behind {
        checkpoint: Tag,
        latest: Tag,
        missing: usize,
    },
    /// Checkpoint equals the catalog maximum.
    Current { checkpoint: Tag },
}

/// Status of every configured line, in declared order.
pub fn report(
    cfg: &MirrorConfig,
    upstream: &dyn Upstream,
) -> Result<Vec<(ReleaseLine, LineStatus)>, MirrorError> {
    let catalog = TagCatalog::new(upstream.tag_list()?);
    let mut rows = Vec::new();
    for line in &cfg.lines {
        let status = check_line(&cfg.mirror, &catalog, line)?;
        rows.push((line.clone(), status));
    }
    Ok(rows)
}

/// Classify one line.
pub fn check_line(
    mirror_root: &Path,
    catalog: &TagCatalog,
    line: &ReleaseLine,
) -> Result<LineStatus, MirrorError> {
    let candidates = catalog.matching(line)?;
    let Some(latest) = candidates.last() else {
        return Ok(LineStatus::NoTags);
    };

    let checkpoint = match checkpoint::read(mirror_root, line)? {
        None => {
            return Ok(LineStatus::NeverMirrored {
                latest: latest.clone(),
                missing: candidates.len(),
            })
        }
        Some(token) => Tag::parse(&token)?,
    };

    if checkpoint.key() == latest.key() {
        return Ok(LineStatus::Current {
            checkpoint,
        });
    }

    let missing = range::resolve(&candidates, Some(&checkpoint))?.len();
    Ok(LineStatus::Behind {
        checkpoint,
        latest: latest.clone(),
        missing,
    })
}
