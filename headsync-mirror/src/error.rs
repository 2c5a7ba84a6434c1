//! Error types for headsync-mirror.

use std::path::PathBuf;

use thiserror::Error;

use headsync_core::error::{CheckpointError, RangeError, TagError};

/// All errors that can arise from mirror operations.
///
/// Every variant is fatal to the current run: nothing is retried, and a
/// failure in one release line aborts the remaining lines. Re-running after
/// fixing the external cause is always safe — the pipeline resumes from the
/// last checkpoint.
#[derive(Debug, Error)]
pub enum MirrorError {
    /// A tag token failed parsing.
    #[error("tag error: {0}")]
    Tag(#[from] TagError),

    /// Update-range resolution failed.
    #[error("range error: {0}")]
    Range(#[from] RangeError),

    /// Checkpoint file I/O failed.
    #[error("checkpoint error: {0}")]
    Checkpoint(#[from] CheckpointError),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A git invocation exited non-zero.
    #[error("git {action} failed ({status}): {stderr}")]
    Git {
        action: String,
        status: String,
        stderr: String,
    },

    /// The export tool exited non-zero for one architecture. Aborts the
    /// whole tag — a partial export must never be committed.
    #[error("header export failed for architecture '{arch}' ({status})")]
    ExportFailed { arch: String, status: String },

    /// The underlying commit operation rejected the commit.
    #[error("commit for tag '{tag}' failed: {source}")]
    CommitFailed {
        tag: String,
        #[source]
        source: Box<MirrorError>,
    },

    /// A `--line` scope named a release line the config does not track.
    #[error("release line '{line}' is not configured")]
    UnknownLine { line: String },
}

/// Convenience constructor for [`MirrorError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> MirrorError {
    MirrorError::Io {
        path: path.into(),
        source,
    }
}
