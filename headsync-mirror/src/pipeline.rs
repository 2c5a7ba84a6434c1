//! The update pipeline — canonical entrypoint for `headsync update`.
//!
//! Per release line, in configured order: snapshot candidates → load
//! checkpoint → short-circuit if current → resolve the update range → per
//! tag ascending: checkout, export all architectures, commit, write the
//! checkpoint. The checkpoint write coming last is the resumability
//! contract: a crash anywhere mid-tag leaves the line at its previous
//! checkpoint, and the next run replays the in-flight tag from scratch.
//!
//! Everything is single-threaded and sequential; the shared upstream working
//! tree makes any finer-grained parallelism unsafe.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::{debug, info, warn};

use headsync_core::{catalog::TagCatalog, checkpoint, range, MirrorConfig, ReleaseLine, Tag};

use crate::committer::{self, CommitOutcome};
use crate::error::{io_err, MirrorError};
use crate::export::{self, ExportOutcome, Exporter};
use crate::git::GitRepo;
use crate::upstream::Upstream;

/// Scope for an update run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateScope {
    /// Every configured release line, in declared order.
    All,
    /// A single configured release line.
    Line(ReleaseLine),
}

/// What happened (or would happen) for one tag in a line's update range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The tag was exported, committed, and checkpointed.
    Applied {
        tag: Tag,
        commit: CommitOutcome,
        exports: BTreeMap<String, ExportOutcome>,
    },
    /// Dry-run: the tag would be replayed.
    WouldApply { tag: Tag },
}

/// Per-line result of an update run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineOutcome {
    pub line: ReleaseLine,
    pub disposition: LineDisposition,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineDisposition {
    /// No final upstream tags exist for this line yet.
    NoTags,
    /// Checkpoint already equals the catalog maximum; nothing touched.
    Current { checkpoint: Tag },
    /// The line had an update range (empty only in dry-run edge cases).
    Updated { updates: Vec<UpdateOutcome> },
}

/// Run the update pipeline.
///
/// Aborts on the first failure; lines after the failing one are not
/// attempted, and no checkpoint is written for the in-flight tag.
pub fn run(
    cfg: &MirrorConfig,
    upstream: &dyn Upstream,
    exporter: &dyn Exporter,
    mirror: &GitRepo,
    scope: UpdateScope,
    dry_run: bool,
) -> Result<Vec<LineOutcome>, MirrorError> {
    // One consistency snapshot per run, shared by every line.
    let catalog = TagCatalog::new(upstream.tag_list()?);

    let lines: Vec<&ReleaseLine> = match &scope {
        UpdateScope::All => cfg.lines.iter().collect(),
        UpdateScope::Line(wanted) => {
            let Some(line) = cfg.lines.iter().find(|l| *l == wanted) else {
                return Err(MirrorError::UnknownLine {
                    line: wanted.to_string(),
                });
            };
            vec![line]
        }
    };

    let mut results = Vec::new();
    for line in lines {
        results.push(update_line(
            cfg, &catalog, upstream, exporter, mirror, line, dry_run,
        )?);
    }
    Ok(results)
}

fn update_line(
    cfg: &MirrorConfig,
    catalog: &TagCatalog,
    upstream: &dyn Upstream,
    exporter: &dyn Exporter,
    mirror: &GitRepo,
    line: &ReleaseLine,
    dry_run: bool,
) -> Result<LineOutcome, MirrorError> {
    let candidates = catalog.matching(line)?;
    let Some(stop) = candidates.last() else {
        warn!("line {line}: no upstream tags yet; nothing to do");
        return Ok(LineOutcome {
            line: line.clone(),
            disposition: LineDisposition::NoTags,
        });
    };

    let checkpoint = load_checkpoint(&cfg.mirror, line)?;
    if checkpoint.as_ref().is_some_and(|cp| cp.key() == stop.key()) {
        debug!("line {line}: current at {stop}");
        return Ok(LineOutcome {
            line: line.clone(),
            disposition: LineDisposition::Current {
                checkpoint: stop.clone(),
            },
        });
    }

    let tags = range::resolve(&candidates, checkpoint.as_ref())?;
    if let (Some(first), Some(last)) = (tags.first(), tags.last()) {
        info!("line {line}: {} release(s) to replay, {first} -> {last}", tags.len());
    }

    let mut updates = Vec::new();
    for tag in &tags {
        if dry_run {
            updates.push(UpdateOutcome::WouldApply { tag: tag.clone() });
            continue;
        }
        updates.push(apply_tag(cfg, upstream, exporter, mirror, line, tag)?);
    }

    Ok(LineOutcome {
        line: line.clone(),
        disposition: LineDisposition::Updated { updates },
    })
}

/// Export, commit, checkpoint — strictly in that order.
fn apply_tag(
    cfg: &MirrorConfig,
    upstream: &dyn Upstream,
    exporter: &dyn Exporter,
    mirror: &GitRepo,
    line: &ReleaseLine,
    tag: &Tag,
) -> Result<UpdateOutcome, MirrorError> {
    upstream.checkout(tag.token())?;

    let tag_dir = checkpoint::line_dir(&cfg.mirror, line).join(tag.token());
    reset_dir(&tag_dir)?;

    let exports = export::export_all(upstream, exporter, tag, &tag_dir, &cfg.excluded_arches)?;
    let commit = committer::commit_tag(mirror, line, tag, &tag_dir)?;
    checkpoint::write(&cfg.mirror, line, tag)?;

    info!("line {line}: mirrored {tag}");
    Ok(UpdateOutcome::Applied {
        tag: tag.clone(),
        commit,
        exports,
    })
}

fn load_checkpoint(mirror_root: &Path, line: &ReleaseLine) -> Result<Option<Tag>, MirrorError> {
    match checkpoint::read(mirror_root, line)? {
        None => Ok(None),
        Some(token) => Ok(Some(Tag::parse(&token)?)),
    }
}

/// Remove and recreate a per-tag output directory, so a replay never sees
/// leftovers from an interrupted export.
fn reset_dir(dir: &Path) -> Result<(), MirrorError> {
    if dir.exists() {
        std::fs::remove_dir_all(dir).map_err(|e| io_err(dir, e))?;
    }
    std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;
    Ok(())
}
