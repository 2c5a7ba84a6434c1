//! Subcommand implementations.

pub mod lines;
pub mod status;
pub mod update;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use headsync_core::MirrorConfig;

/// Default config file name, looked up in the current directory.
pub const DEFAULT_CONFIG: &str = "headsync.yaml";

/// Environment variable overriding the default config path.
pub const CONFIG_ENV: &str = "HEADSYNC_CONFIG";

/// Shared `--config` handling for every subcommand.
///
/// Resolution order: `--config` flag, then `$HEADSYNC_CONFIG`, then
/// `./headsync.yaml`.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Path to the deployment config file.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl ConfigArgs {
    pub fn load(&self) -> Result<MirrorConfig> {
        let path = self.resolve_path();
        MirrorConfig::load(&path)
            .with_context(|| format!("failed to load config from {}", path.display()))
    }

    fn resolve_path(&self) -> PathBuf {
        if let Some(path) = &self.config {
            return path.clone();
        }
        if let Ok(env_path) = std::env::var(CONFIG_ENV) {
            if !env_path.is_empty() {
                return PathBuf::from(env_path);
            }
        }
        PathBuf::from(DEFAULT_CONFIG)
    }
}
