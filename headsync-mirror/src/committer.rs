//! Mirror committer — one commit per (line, tag) transition.

use std::path::Path;

use tracing::warn;

use headsync_core::{ReleaseLine, Tag};

use crate::error::MirrorError;
use crate::git::GitRepo;

/// Outcome of committing one tag's export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// A commit was created with the given message.
    Committed { message: String },
    /// Staging produced no change against HEAD — the tag was already
    /// committed by an interrupted earlier run.
    NoChanges,
}

/// Deterministic commit message for a (line, tag) transition.
pub fn commit_message(line: &ReleaseLine, tag: &Tag) -> String {
    format!("Update {line} to {tag}")
}

/// Force-stage `tag_dir` and commit it.
///
/// Returns [`CommitOutcome::NoChanges`] when the staged content is identical
/// to HEAD. That is the expected signature of resumption after a crash
/// between commit and checkpoint write — the one place an empty commit is
/// not suspicious. For a genuinely new tag an empty diff cannot normally
/// occur (the tag directory is a fresh path), so it is still logged loudly:
/// it may indicate an export regression.
pub fn commit_tag(
    mirror: &GitRepo,
    line: &ReleaseLine,
    tag: &Tag,
    tag_dir: &Path,
) -> Result<CommitOutcome, MirrorError> {
    mirror.stage_force(tag_dir)?;

    if !mirror.has_staged_changes()? {
        warn!("no staged changes for {tag}; assuming an earlier run already committed it");
        return Ok(CommitOutcome::NoChanges);
    }

    let message = commit_message(line, tag);
    mirror
        .commit(&message)
        .map_err(|e| MirrorError::CommitFailed {
            tag: tag.token().to_string(),
            source: Box::new(e),
        })?;
    Ok(CommitOutcome::Committed { message })
}
