//! Thin wrapper over the `git` binary.
//!
//! Every call is blocking with no timeout — acceptable for a scheduled batch
//! job. Non-zero exits surface as [`MirrorError::Git`] with the captured
//! stderr; nothing is retried here.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{io_err, MirrorError};

/// Handle to a local git repository.
#[derive(Debug, Clone)]
pub struct GitRepo {
    root: PathBuf,
}

impl GitRepo {
    pub fn open(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `git tag -l` — raw token list, order as git reports it.
    pub fn tag_list(&self) -> Result<Vec<String>, MirrorError> {
        let out = self.run(&["tag", "-l"])?;
        Ok(out
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect())
    }

    /// `git checkout -f <rev>` — force the working tree onto a revision.
    pub fn checkout_force(&self, rev: &str) -> Result<(), MirrorError> {
        self.run(&["checkout", "-f", rev]).map(drop)
    }

    /// `git clean -dxf` — remove untracked and ignored files.
    pub fn clean_untracked(&self) -> Result<(), MirrorError> {
        self.run(&["clean", "-dxf"]).map(drop)
    }

    /// `git add -fA <path>` — force-add so ignore rules cannot hide
    /// generated files.
    pub fn stage_force(&self, path: &Path) -> Result<(), MirrorError> {
        let path_arg = path.display().to_string();
        self.run(&["add", "-fA", path_arg.as_str()]).map(drop)
    }

    /// Whether the index differs from HEAD.
    ///
    /// Uses `git diff --cached --quiet`: exit 0 means no staged changes,
    /// exit 1 means the index differs. On an unborn branch git compares
    /// against the empty tree, so the very first commit stages cleanly.
    pub fn has_staged_changes(&self) -> Result<bool, MirrorError> {
        let output = Command::new("git")
            .arg("-C")
            .arg(&self.root)
            .args(["diff", "--cached", "--quiet"])
            .output()
            .map_err(|e| io_err(&self.root, e))?;

        match output.status.code() {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => Err(MirrorError::Git {
                action: "diff".to_string(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }),
        }
    }

    /// `git commit -m <message>` — commit whatever is staged.
    pub fn commit(&self, message: &str) -> Result<(), MirrorError> {
        self.run(&["commit", "-m", message]).map(drop)
    }

    fn run(&self, args: &[&str]) -> Result<String, MirrorError> {
        let output = Command::new("git")
            .arg("-C")
            .arg(&self.root)
            .args(args)
            .output()
            .map_err(|e| io_err(&self.root, e))?;

        if !output.status.success() {
            return Err(MirrorError::Git {
                action: args.first().copied().unwrap_or("git").to_string(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
