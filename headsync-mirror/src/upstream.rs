//! Upstream source tree access.
//!
//! The pipeline only ever touches the upstream through this trait: tag
//! listing, forced checkout, forced clean, and architecture enumeration.
//! Tests drive the pipeline with in-memory fakes; production uses
//! [`GitUpstream`] over the real kernel working tree.

use std::path::{Path, PathBuf};

use crate::error::{io_err, MirrorError};
use crate::git::GitRepo;

/// Name of the architecture directory in the upstream source tree.
pub const ARCH_DIR: &str = "arch";

/// Per-architecture build description file. Its absence for a given tag makes
/// the architecture unexportable there — an expected condition in old
/// releases, not an error.
pub const BUILD_DESCRIPTOR: &str = "Makefile";

/// The upstream source repository, as the pipeline sees it.
///
/// The working tree is the one shared mutable resource in the system; the
/// current (line, tag, arch) step owns it exclusively.
pub trait Upstream {
    /// Raw tag tokens, order as reported by the source. Read once per run.
    fn tag_list(&self) -> Result<Vec<String>, MirrorError>;

    /// Force the working tree onto `tag`.
    fn checkout(&self, tag: &str) -> Result<(), MirrorError>;

    /// Remove all untracked and ignored files from the working tree.
    fn clean(&self) -> Result<(), MirrorError>;

    /// Entry names of the architecture directory at the current checkout,
    /// unfiltered and in no particular order.
    fn arch_names(&self) -> Result<Vec<String>, MirrorError>;

    /// Whether the build descriptor exists for `arch` at the current
    /// checkout.
    fn has_build_descriptor(&self, arch: &str) -> bool;
}

/// Production upstream: a git working tree on local disk.
#[derive(Debug, Clone)]
pub struct GitUpstream {
    repo: GitRepo,
}

impl GitUpstream {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            repo: GitRepo::open(root),
        }
    }

    pub fn root(&self) -> &Path {
        self.repo.root()
    }
}

impl Upstream for GitUpstream {
    fn tag_list(&self) -> Result<Vec<String>, MirrorError> {
        self.repo.tag_list()
    }

    fn checkout(&self, tag: &str) -> Result<(), MirrorError> {
        self.repo.checkout_force(tag)
    }

    fn clean(&self) -> Result<(), MirrorError> {
        self.repo.clean_untracked()
    }

    fn arch_names(&self) -> Result<Vec<String>, MirrorError> {
        let dir = self.repo.root().join(ARCH_DIR);
        let entries = std::fs::read_dir(&dir).map_err(|e| io_err(&dir, e))?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| io_err(&dir, e))?;
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        Ok(names)
    }

    fn has_build_descriptor(&self, arch: &str) -> bool {
        self.repo
            .root()
            .join(ARCH_DIR)
            .join(arch)
            .join(BUILD_DESCRIPTOR)
            .exists()
    }
}
