//! `headsync update` — replay missing upstream releases into the mirror.

use anyhow::{Context, Result};
use clap::Args;

use headsync_core::ReleaseLine;
use headsync_mirror::{
    pipeline, CommitOutcome, ExportOutcome, GitRepo, GitUpstream, LineDisposition, LineOutcome,
    MakeExporter, UpdateOutcome, UpdateScope,
};

use super::ConfigArgs;

/// Arguments for `headsync update`.
#[derive(Args, Debug)]
pub struct UpdateArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Restrict the run to a single release line (e.g. "5.4.x").
    #[arg(long)]
    pub line: Option<String>,

    /// Resolve and print the update plan without exporting or committing.
    #[arg(long)]
    pub dry_run: bool,
}

impl UpdateArgs {
    pub fn run(self) -> Result<()> {
        let cfg = self.config.load()?;

        let upstream = GitUpstream::new(&cfg.upstream);
        let exporter = MakeExporter::new(&cfg.upstream);
        let mirror = GitRepo::open(&cfg.mirror);
        let scope = match &self.line {
            Some(pattern) => UpdateScope::Line(ReleaseLine::from(pattern.as_str())),
            None => UpdateScope::All,
        };

        let outcomes = pipeline::run(&cfg, &upstream, &exporter, &mirror, scope, self.dry_run)
            .context("update failed")?;

        for outcome in &outcomes {
            print_outcome(outcome, self.dry_run);
        }
        Ok(())
    }
}

fn print_outcome(outcome: &LineOutcome, dry_run: bool) {
    let prefix = if dry_run { "[dry-run] " } else { "" };
    match &outcome.disposition {
        LineDisposition::NoTags => {
            println!("{prefix}! '{}' — no upstream tags yet", outcome.line);
        }
        LineDisposition::Current { checkpoint } => {
            println!("{prefix}✓ '{}' — current at {checkpoint}", outcome.line);
        }
        LineDisposition::Updated { updates } => {
            println!(
                "{prefix}✓ '{}' — {} release(s)",
                outcome.line,
                updates.len()
            );
            for update in updates {
                print_update(update);
            }
        }
    }
}

fn print_update(update: &UpdateOutcome) {
    match update {
        UpdateOutcome::WouldApply { tag } => println!("  ~  {tag}"),
        UpdateOutcome::Applied {
            tag,
            commit: CommitOutcome::Committed { .. },
            exports,
        } => {
            let skipped = exports
                .values()
                .filter(|o| matches!(o, ExportOutcome::Skipped { .. }))
                .count();
            if skipped > 0 {
                println!("  ✎  {tag} ({} arches, {skipped} skipped)", exports.len());
            } else {
                println!("  ✎  {tag} ({} arches)", exports.len());
            }
        }
        UpdateOutcome::Applied {
            tag,
            commit: CommitOutcome::NoChanges,
            ..
        } => {
            println!("  ·  {tag} (already committed)");
        }
    }
}
