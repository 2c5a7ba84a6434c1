//! Error types for headsync-core.

use std::path::PathBuf;

use thiserror::Error;

/// A tag token that cannot participate in version ordering.
#[derive(Debug, Error)]
pub enum TagError {
    /// Prefix absent or a dotted component failed integer parsing.
    #[error("malformed tag '{token}': {reason}")]
    Malformed { token: String, reason: String },
}

/// Failures while resolving an update range for a release line.
#[derive(Debug, Error)]
pub enum RangeError {
    /// The persisted checkpoint references a tag that is no longer a
    /// candidate — e.g. after an upstream history rewrite.
    #[error("checkpoint tag '{tag}' is not among the candidate tags")]
    UnknownCheckpoint { tag: String },

    /// The computed stop tag is not among the candidates (defensive; cannot
    /// happen when the stop is taken from the candidate set itself).
    #[error("stop tag '{tag}' is not among the candidate tags")]
    UnknownStopTag { tag: String },

    /// Internal-consistency fault: duplicate or unsorted candidates slipped
    /// past ingestion. Fatal, never recovered.
    #[error("update range invariant violated: {detail}")]
    Invariant { detail: String },
}

/// Failures reading or writing a `.version` checkpoint file.
#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience constructor for [`CheckpointError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> CheckpointError {
    CheckpointError::Io {
        path: path.into(),
        source,
    }
}

/// Failures loading the deployment configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure (permission denied, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parse error on load — includes file path and line context.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The config file did not exist at the expected path.
    #[error("config not found at {path}")]
    NotFound { path: PathBuf },
}
