//! `headsync lines` — list configured release lines.

use anyhow::{Context, Result};
use clap::Args;

use headsync_core::checkpoint;

use super::ConfigArgs;

/// Arguments for `headsync lines`.
#[derive(Args, Debug)]
pub struct LinesArgs {
    #[command(flatten)]
    pub config: ConfigArgs,
}

impl LinesArgs {
    pub fn run(self) -> Result<()> {
        let cfg = self.config.load()?;

        for line in &cfg.lines {
            let cp = checkpoint::read(&cfg.mirror, line)
                .with_context(|| format!("failed to read checkpoint for '{line}'"))?;
            match cp {
                Some(token) => {
                    println!("{line}  (tags {}*, checkpoint {token})", line.tag_prefix());
                }
                None => {
                    println!("{line}  (tags {}*, never mirrored)", line.tag_prefix());
                }
            }
        }
        Ok(())
    }
}
