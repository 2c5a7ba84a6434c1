//! Per-line checkpoint persistence.
//!
//! # Storage layout
//!
//! ```text
//! <mirror_root>/
//!   <line>/                 (e.g. "5.4.x/")
//!     .version              (raw tag token of the last fully-mirrored tag)
//!     <tag>/                (one directory per mirrored tag)
//!       <arch>/...
//! ```
//!
//! The `.version` file IS the checkpoint store: a single raw tag token,
//! trimmed of surrounding whitespace, no additional metadata. It is written
//! strictly after a tag's commit succeeds — the resumability contract. Writes
//! use the `.tmp` + rename pattern so a crash never leaves a torn token.

use std::path::{Path, PathBuf};

use crate::error::{io_err, CheckpointError};
use crate::types::{ReleaseLine, Tag};

/// Name of the checkpoint file inside a line's mirror directory.
pub const VERSION_FILE: &str = ".version";

/// `<mirror_root>/<line>/` — pure, no I/O.
pub fn line_dir(mirror_root: &Path, line: &ReleaseLine) -> PathBuf {
    mirror_root.join(line.as_str())
}

/// `<mirror_root>/<line>/.version` — pure, no I/O.
pub fn version_path(mirror_root: &Path, line: &ReleaseLine) -> PathBuf {
    line_dir(mirror_root, line).join(VERSION_FILE)
}

/// Read the checkpoint token for a line.
///
/// Returns `None` when no checkpoint exists yet (file absent or blank).
pub fn read(mirror_root: &Path, line: &ReleaseLine) -> Result<Option<String>, CheckpointError> {
    let path = version_path(mirror_root, line);
    if !path.exists() {
        return Ok(None);
    }
    let raw = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
    let token = raw.trim();
    if token.is_empty() {
        return Ok(None);
    }
    Ok(Some(token.to_string()))
}

/// Persist `tag` as the line's checkpoint, atomically.
///
/// Creates the line directory if needed. Must only be called after the tag's
/// export and commit have fully succeeded.
pub fn write(mirror_root: &Path, line: &ReleaseLine, tag: &Tag) -> Result<(), CheckpointError> {
    let dir = line_dir(mirror_root, line);
    std::fs::create_dir_all(&dir).map_err(|e| io_err(&dir, e))?;

    let path = version_path(mirror_root, line);
    let tmp = path.with_file_name(format!("{VERSION_FILE}.tmp"));
    std::fs::write(&tmp, format!("{}\n", tag.token())).map_err(|e| io_err(&tmp, e))?;
    std::fs::rename(&tmp, &path).map_err(|e| io_err(&path, e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn line() -> ReleaseLine {
        ReleaseLine::from("5.4.x")
    }

    #[test]
    fn read_missing_returns_none() {
        let root = TempDir::new().unwrap();
        assert_eq!(read(root.path(), &line()).unwrap(), None);
    }

    #[test]
    fn write_then_read_roundtrip() {
        let root = TempDir::new().unwrap();
        let tag = Tag::parse("v5.4.10").unwrap();
        write(root.path(), &line(), &tag).unwrap();
        assert_eq!(
            read(root.path(), &line()).unwrap(),
            Some("v5.4.10".to_string())
        );
    }

    #[test]
    fn read_trims_surrounding_whitespace() {
        let root = TempDir::new().unwrap();
        let dir = line_dir(root.path(), &line());
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(VERSION_FILE), "  v5.4.9\n\n").unwrap();
        assert_eq!(
            read(root.path(), &line()).unwrap(),
            Some("v5.4.9".to_string())
        );
    }

    #[test]
    fn blank_file_reads_as_no_checkpoint() {
        let root = TempDir::new().unwrap();
        let dir = line_dir(root.path(), &line());
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(VERSION_FILE), "\n").unwrap();
        assert_eq!(read(root.path(), &line()).unwrap(), None);
    }

    #[test]
    fn write_overwrites_previous_checkpoint() {
        let root = TempDir::new().unwrap();
        write(root.path(), &line(), &Tag::parse("v5.4.9").unwrap()).unwrap();
        write(root.path(), &line(), &Tag::parse("v5.4.10").unwrap()).unwrap();
        assert_eq!(
            read(root.path(), &line()).unwrap(),
            Some("v5.4.10".to_string())
        );
    }

    #[test]
    fn tmp_file_cleaned_up_after_write() {
        let root = TempDir::new().unwrap();
        write(root.path(), &line(), &Tag::parse("v5.4.9").unwrap()).unwrap();
        let tmp = version_path(root.path(), &line()).with_file_name(".version.tmp");
        assert!(!tmp.exists(), ".tmp must be gone after atomic rename");
    }
}
