//! Deployment configuration.
//!
//! A single YAML file describes one mirror deployment:
//!
//! ```yaml
//! upstream: /srv/linux
//! mirror: /srv/linux-headers
//! lines:
//!   - 5.4.x
//!   - 5.10.x
//! excluded_arches:
//!   - Kconfig
//!   - .gitignore
//!   - um
//! ```
//!
//! `lines` and `excluded_arches` default to the upstream project's long-term
//! branches and the known non-exportable entries when omitted. Line order in
//! the file is the processing order.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::ReleaseLine;

/// Static configuration for one mirror deployment. Owned by the orchestrator;
/// immutable for the lifetime of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirrorConfig {
    /// Path to the upstream source repository (the shared working tree).
    pub upstream: PathBuf,

    /// Path to the downstream mirror repository root.
    pub mirror: PathBuf,

    /// Tracked release lines, in processing order.
    #[serde(default = "default_lines")]
    pub lines: Vec<ReleaseLine>,

    /// `arch/` directory entries never offered to the exporter: entries that
    /// are not architectures, plus architectures whose headers are not
    /// exportable.
    #[serde(default = "default_excluded_arches")]
    pub excluded_arches: BTreeSet<String>,
}

impl MirrorConfig {
    /// Load and parse the config file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let contents = std::fs::read_to_string(path)?;
        serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

fn default_lines() -> Vec<ReleaseLine> {
    ["4.14.x", "4.19.x", "5.4.x", "5.10.x", "5.15.x", "6.1.x", "6.6.x"]
        .into_iter()
        .map(ReleaseLine::from)
        .collect()
}

/// The built-in exclusion set: entries in `arch/` that are not architectures,
/// plus architectures whose headers are not exportable.
pub fn default_excluded_arches() -> BTreeSet<String> {
    // "um" headers are not exportable; the other two are stray files in the
    // arch/ directory, not architectures.
    ["Kconfig", ".gitignore", "um"]
        .into_iter()
        .map(str::to_string)
        .collect()
}
