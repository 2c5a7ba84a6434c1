//! `headsync status` — per-line mirror progress visibility.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use headsync_core::ReleaseLine;
use headsync_mirror::{status, GitUpstream, LineStatus};

use super::ConfigArgs;

/// Arguments for `headsync status`.
#[derive(Args, Debug)]
pub struct StatusArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl StatusArgs {
    pub fn run(self) -> Result<()> {
        let cfg = self.config.load()?;
        let upstream = GitUpstream::new(&cfg.upstream);

        let rows = status::report(&cfg, &upstream).context("status check failed")?;
        if self.json {
            print_json(&rows)?;
            return Ok(());
        }

        print_table(&rows);
        Ok(())
    }
}

#[derive(Serialize)]
struct StatusReportJson {
    summary: StatusSummaryJson,
    lines: Vec<LineStatusJson>,
}

#[derive(Serialize)]
struct StatusSummaryJson {
    lines: usize,
    behind: usize,
}

#[derive(Serialize)]
struct LineStatusJson {
    line: String,
    status: String,
    checkpoint: Option<String>,
    latest: Option<String>,
    missing: usize,
}

#[derive(Tabled)]
struct StatusTableRow {
    #[tabled(rename = "line")]
    line: String,
    #[tabled(rename = "status")]
    status: String,
    #[tabled(rename = "checkpoint")]
    checkpoint: String,
    #[tabled(rename = "latest")]
    latest: String,
    #[tabled(rename = "behind")]
    behind: String,
}

fn print_json(rows: &[(ReleaseLine, LineStatus)]) -> Result<()> {
    let behind = rows.iter().filter(|(_, s)| is_outstanding(s)).count();
    let payload = StatusReportJson {
        summary: StatusSummaryJson {
            lines: rows.len(),
            behind,
        },
        lines: rows
            .iter()
            .map(|(line, s)| LineStatusJson {
                line: line.to_string(),
                status: status_key(s).to_string(),
                checkpoint: checkpoint_token(s),
                latest: latest_token(s),
                missing: missing_count(s),
            })
            .collect(),
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&payload).context("failed to serialize status JSON")?
    );
    Ok(())
}

fn print_table(rows: &[(ReleaseLine, LineStatus)]) {
    let behind = rows.iter().filter(|(_, s)| is_outstanding(s)).count();
    println!(
        "headsync v{} | {} lines | {} behind",
        env!("CARGO_PKG_VERSION"),
        rows.len(),
        behind,
    );

    if rows.is_empty() {
        println!("No release lines configured.");
        return;
    }

    println!(
        "Indicators: {} CURRENT  {} BEHIND  {} NEVER MIRRORED  {} NO TAGS",
        "■".green().bold(),
        "■".yellow().bold(),
        "■".red().bold(),
        "■".bright_black().bold(),
    );

    let table_rows: Vec<StatusTableRow> = rows
        .iter()
        .map(|(line, s)| StatusTableRow {
            line: line.to_string(),
            status: status_label(s).to_string(),
            checkpoint: checkpoint_token(s).unwrap_or_else(|| "—".to_string()),
            latest: latest_token(s).unwrap_or_else(|| "—".to_string()),
            behind: match missing_count(s) {
                0 => String::new(),
                n => n.to_string(),
            },
        })
        .collect();
    let mut table = Table::new(table_rows);
    table.with(Style::rounded());
    println!("{table}");

    if behind > 0 {
        println!("Run 'headsync update' to replay outstanding releases.");
    }
}

fn is_outstanding(status: &LineStatus) -> bool {
    matches!(
        status,
        LineStatus::Behind { .. } | LineStatus::NeverMirrored { .. }
    )
}

fn status_key(status: &LineStatus) -> &'static str {
    match status {
        LineStatus::NoTags => "no_tags",
        LineStatus::NeverMirrored { .. } => "never_mirrored",
        LineStatus::Behind { .. } => "behind",
        LineStatus::Current { .. } => "current",
    }
}

fn status_label(status: &LineStatus) -> &'static str {
    match status {
        LineStatus::NoTags => "NO TAGS",
        LineStatus::NeverMirrored { .. } => "NEVER MIRRORED",
        LineStatus::Behind { .. } => "BEHIND",
        LineStatus::Current { .. } => "CURRENT",
    }
}

fn checkpoint_token(status: &LineStatus) -> Option<String> {
    match status {
        LineStatus::Behind { checkpoint, .. } | LineStatus::Current { checkpoint } => {
            Some(checkpoint.token().to_string())
        }
        _ => None,
    }
}

fn latest_token(status: &LineStatus) -> Option<String> {
    match status {
        LineStatus::NeverMirrored { latest, .. } | LineStatus::Behind { latest, .. } => {
            Some(latest.token().to_string())
        }
        LineStatus::Current { checkpoint } => Some(checkpoint.token().to_string()),
        LineStatus::NoTags => None,
    }
}

fn missing_count(status: &LineStatus) -> usize {
    match status {
        LineStatus::NeverMirrored { missing, .. } | LineStatus::Behind { missing, .. } => *missing,
        _ => 0,
    }
}
