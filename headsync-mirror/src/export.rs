//! Export driver — per-architecture header export for one tag.
//!
//! Architectures are processed in lexicographic order (reproducible commit
//! contents and capture paths), each against a freshly cleaned upstream
//! working tree. A skip is recorded, never silent; a failure aborts the whole
//! tag (fail-fast, not fail-isolated).

use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{info, warn};

use headsync_core::Tag;

use crate::error::{io_err, MirrorError};
use crate::upstream::Upstream;

/// Captured stdout of the export tool, written next to the exported tree.
pub const STDOUT_CAPTURE: &str = "stdout.txt";
/// Captured stderr of the export tool.
pub const STDERR_CAPTURE: &str = "stderr.txt";

/// The opaque export operation: produce an installed header tree for one
/// architecture at the currently checked-out tag.
pub trait Exporter {
    fn export(&self, arch: &str, out_dir: &Path) -> Result<(), MirrorError>;
}

/// Result for one (tag, architecture) pair. Every enumerated architecture
/// appears in the output as exactly one of these — never a silent loss.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// Headers were exported into `dir`.
    Exported { dir: PathBuf },
    /// Architecture not exportable for this tag.
    Skipped { reason: String },
}

/// Export every non-excluded architecture for `tag` into `tag_dir`.
///
/// The upstream working tree must already be checked out at `tag`. The tree
/// is force-cleaned before each architecture's export so no generated output
/// leaks across architectures.
pub fn export_all(
    upstream: &dyn Upstream,
    exporter: &dyn Exporter,
    tag: &Tag,
    tag_dir: &Path,
    excluded: &BTreeSet<String>,
) -> Result<BTreeMap<String, ExportOutcome>, MirrorError> {
    let mut arches: Vec<String> = upstream
        .arch_names()?
        .into_iter()
        .filter(|a| !excluded.contains(a))
        .collect();
    arches.sort();

    let mut outcomes = BTreeMap::new();
    for arch in arches {
        if !upstream.has_build_descriptor(&arch) {
            warn!("skipping {tag} {arch}: no build descriptor");
            outcomes.insert(
                arch,
                ExportOutcome::Skipped {
                    reason: "no build descriptor".to_string(),
                },
            );
            continue;
        }

        info!("exporting {tag} {arch}");
        upstream.clean()?;

        let arch_dir = tag_dir.join(&arch);
        std::fs::create_dir_all(&arch_dir).map_err(|e| io_err(&arch_dir, e))?;
        exporter.export(&arch, &arch_dir)?;
        outcomes.insert(arch, ExportOutcome::Exported { dir: arch_dir });
    }

    Ok(outcomes)
}

/// Production exporter: `make ARCH=<arch> INSTALL_HDR_PATH=<dir>
/// headers_install` in the upstream tree, with stdout/stderr captured to
/// files inside the output directory for audit.
#[derive(Debug, Clone)]
pub struct MakeExporter {
    upstream_root: PathBuf,
}

impl MakeExporter {
    pub fn new(upstream_root: impl Into<PathBuf>) -> Self {
        Self {
            upstream_root: upstream_root.into(),
        }
    }
}

impl Exporter for MakeExporter {
    fn export(&self, arch: &str, out_dir: &Path) -> Result<(), MirrorError> {
        // make runs with the upstream tree as cwd; the install path must be
        // absolute or it would resolve inside that tree.
        let out_abs = out_dir.canonicalize().map_err(|e| io_err(out_dir, e))?;

        let stdout_path = out_dir.join(STDOUT_CAPTURE);
        let stderr_path = out_dir.join(STDERR_CAPTURE);
        let stdout = File::create(&stdout_path).map_err(|e| io_err(&stdout_path, e))?;
        let stderr = File::create(&stderr_path).map_err(|e| io_err(&stderr_path, e))?;

        let status = Command::new("make")
            .arg(format!("ARCH={arch}"))
            .arg(format!("INSTALL_HDR_PATH={}", out_abs.display()))
            .arg("headers_install")
            .current_dir(&self.upstream_root)
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::from(stderr))
            .status()
            .map_err(|e| io_err(&self.upstream_root, e))?;

        if !status.success() {
            return Err(MirrorError::ExportFailed {
                arch: arch.to_string(),
                status: status.to_string(),
            });
        }
        Ok(())
    }
}
