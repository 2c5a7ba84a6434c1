//! End-to-end pipeline tests: fake upstream + fake exporter, real git on the
//! mirror side. Covers the idempotence and resumability contracts.

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use tempfile::TempDir;

use headsync_core::{checkpoint, config, MirrorConfig, ReleaseLine, Tag};
use headsync_mirror::{
    pipeline, CommitOutcome, Exporter, GitRepo, LineDisposition, MirrorError, UpdateOutcome,
    UpdateScope, Upstream,
};

// ---------------------------------------------------------------------------
// git helpers
// ---------------------------------------------------------------------------

fn git(dir: &Path, args: &[&str]) -> String {
    let output = std::process::Command::new("git")
        .arg("-C")
        .arg(dir)
        .args(args)
        .output()
        .expect("run git");
    assert!(
        output.status.success(),
        "git {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

fn init_mirror_repo(dir: &Path) {
    git(dir, &["init", "-q"]);
    git(dir, &["config", "user.email", "headsync@test.invalid"]);
    git(dir, &["config", "user.name", "headsync tests"]);
    git(dir, &["commit", "--allow-empty", "-m", "init"]);
}

fn commit_count(dir: &Path) -> usize {
    git(dir, &["rev-list", "--count", "HEAD"])
        .parse()
        .expect("commit count")
}

fn last_message(dir: &Path) -> String {
    git(dir, &["log", "-1", "--pretty=%s"])
}

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

/// Upstream with a fixed tag namespace; tracks the current checkout so the
/// fake exporter can produce tag-dependent content.
struct FakeUpstream {
    tags: Vec<String>,
    current: Rc<RefCell<String>>,
}

impl FakeUpstream {
    fn new(tags: &[&str], current: Rc<RefCell<String>>) -> Self {
        Self {
            tags: tags.iter().map(|t| t.to_string()).collect(),
            current,
        }
    }
}

impl Upstream for FakeUpstream {
    fn tag_list(&self) -> Result<Vec<String>, MirrorError> {
        Ok(self.tags.clone())
    }
    fn checkout(&self, tag: &str) -> Result<(), MirrorError> {
        *self.current.borrow_mut() = tag.to_string();
        Ok(())
    }
    fn clean(&self) -> Result<(), MirrorError> {
        Ok(())
    }
    fn arch_names(&self) -> Result<Vec<String>, MirrorError> {
        Ok(vec!["x86".to_string(), "arm64".to_string()])
    }
    fn has_build_descriptor(&self, _arch: &str) -> bool {
        true
    }
}

/// Writes one deterministic header per (tag, arch); optionally fails when a
/// chosen tag is checked out.
struct FakeExporter {
    current: Rc<RefCell<String>>,
    fail_at_tag: Option<String>,
}

impl Exporter for FakeExporter {
    fn export(&self, arch: &str, out_dir: &Path) -> Result<(), MirrorError> {
        let tag = self.current.borrow().clone();
        if self.fail_at_tag.as_deref() == Some(tag.as_str()) {
            return Err(MirrorError::ExportFailed {
                arch: arch.to_string(),
                status: "exit status: 2".to_string(),
            });
        }
        std::fs::write(
            out_dir.join("unistd.h"),
            format!("/* {tag} {arch} */\n"),
        )
        .expect("write header");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Fixture
// ---------------------------------------------------------------------------

struct Fixture {
    _mirror_dir: TempDir,
    cfg: MirrorConfig,
    mirror: GitRepo,
    upstream: FakeUpstream,
    exporter: FakeExporter,
}

impl Fixture {
    fn new(tags: &[&str], lines: &[&str]) -> Self {
        Self::with_failing_tag(tags, lines, None)
    }

    fn with_failing_tag(tags: &[&str], lines: &[&str], fail_at_tag: Option<&str>) -> Self {
        let mirror_dir = TempDir::new().expect("mirror dir");
        init_mirror_repo(mirror_dir.path());

        let current = Rc::new(RefCell::new(String::new()));
        let cfg = MirrorConfig {
            upstream: PathBuf::from("/unused"),
            mirror: mirror_dir.path().to_path_buf(),
            lines: lines.iter().map(|l| ReleaseLine::from(*l)).collect(),
            excluded_arches: config::default_excluded_arches(),
        };
        let mirror = GitRepo::open(mirror_dir.path());
        let upstream = FakeUpstream::new(tags, Rc::clone(&current));
        let exporter = FakeExporter {
            current,
            fail_at_tag: fail_at_tag.map(str::to_string),
        };

        Self {
            _mirror_dir: mirror_dir,
            cfg,
            mirror,
            upstream,
            exporter,
        }
    }

    fn run(&self, scope: UpdateScope, dry_run: bool) -> Result<Vec<pipeline::LineOutcome>, MirrorError> {
        pipeline::run(
            &self.cfg,
            &self.upstream,
            &self.exporter,
            &self.mirror,
            scope,
            dry_run,
        )
    }

    fn mirror_root(&self) -> &Path {
        &self.cfg.mirror
    }
}

fn applied_tokens(outcome: &pipeline::LineOutcome) -> Vec<String> {
    match &outcome.disposition {
        LineDisposition::Updated { updates } => updates
            .iter()
            .map(|u| match u {
                UpdateOutcome::Applied { tag, .. } => tag.token().to_string(),
                UpdateOutcome::WouldApply { tag } => tag.token().to_string(),
            })
            .collect(),
        _ => Vec::new(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn replays_full_history_when_never_mirrored() {
    let fx = Fixture::new(&["v5.4.9", "v5.4.10", "v5.4.11-rc1"], &["5.4.x"]);
    let base = commit_count(fx.mirror_root());

    let outcomes = fx.run(UpdateScope::All, false).expect("run");
    assert_eq!(applied_tokens(&outcomes[0]), vec!["v5.4.9", "v5.4.10"]);

    assert_eq!(commit_count(fx.mirror_root()), base + 2);
    assert_eq!(
        checkpoint::read(fx.mirror_root(), &ReleaseLine::from("5.4.x")).expect("read"),
        Some("v5.4.10".to_string())
    );
}

#[test]
fn checkpoint_resumes_mid_history() {
    let fx = Fixture::new(&["v5.4.9", "v5.4.10", "v5.4.11"], &["5.4.x"]);
    let line = ReleaseLine::from("5.4.x");
    checkpoint::write(fx.mirror_root(), &line, &Tag::parse("v5.4.9").expect("tag"))
        .expect("seed checkpoint");
    let base = commit_count(fx.mirror_root());

    let outcomes = fx.run(UpdateScope::All, false).expect("run");
    assert_eq!(applied_tokens(&outcomes[0]), vec!["v5.4.10", "v5.4.11"]);

    assert_eq!(commit_count(fx.mirror_root()), base + 2);
    assert_eq!(last_message(fx.mirror_root()), "Update 5.4.x to v5.4.11");
    assert_eq!(
        checkpoint::read(fx.mirror_root(), &line).expect("read"),
        Some("v5.4.11".to_string())
    );

    // per-tag layout: <line>/<tag>/<arch>/
    let arch_dir = fx
        .mirror_root()
        .join("5.4.x")
        .join("v5.4.10")
        .join("arm64");
    assert!(arch_dir.join("unistd.h").exists());
}

#[test]
fn second_run_is_a_no_op() {
    let fx = Fixture::new(&["v5.4.9", "v5.4.10"], &["5.4.x"]);
    fx.run(UpdateScope::All, false).expect("first run");
    let commits = commit_count(fx.mirror_root());

    let outcomes = fx.run(UpdateScope::All, false).expect("second run");
    assert!(matches!(
        outcomes[0].disposition,
        LineDisposition::Current { .. }
    ));
    assert_eq!(commit_count(fx.mirror_root()), commits);
    assert_eq!(
        checkpoint::read(fx.mirror_root(), &ReleaseLine::from("5.4.x")).expect("read"),
        Some("v5.4.10".to_string())
    );
}

#[test]
fn resumes_with_noop_commit_after_crash_between_commit_and_checkpoint() {
    let fx = Fixture::new(&["v5.4.9", "v5.4.10"], &["5.4.x"]);
    let line = ReleaseLine::from("5.4.x");
    fx.run(UpdateScope::All, false).expect("first run");
    let commits = commit_count(fx.mirror_root());

    // Simulate dying after v5.4.10's commit but before its checkpoint write:
    // rewind the checkpoint to the previous tag.
    checkpoint::write(fx.mirror_root(), &line, &Tag::parse("v5.4.9").expect("tag"))
        .expect("rewind");

    let outcomes = fx.run(UpdateScope::All, false).expect("resume run");
    let LineDisposition::Updated { updates } = &outcomes[0].disposition else {
        panic!("expected an update range on resume");
    };
    assert_eq!(updates.len(), 1);
    let UpdateOutcome::Applied { tag, commit, .. } = &updates[0] else {
        panic!("expected applied outcome");
    };
    assert_eq!(tag.token(), "v5.4.10");
    assert_eq!(*commit, CommitOutcome::NoChanges);

    // No new commit; checkpoint restored to the maximum.
    assert_eq!(commit_count(fx.mirror_root()), commits);
    assert_eq!(
        checkpoint::read(fx.mirror_root(), &line).expect("read"),
        Some("v5.4.10".to_string())
    );
}

#[test]
fn dry_run_plans_without_side_effects() {
    let fx = Fixture::new(&["v5.4.9", "v5.4.10"], &["5.4.x"]);
    let base = commit_count(fx.mirror_root());

    let outcomes = fx.run(UpdateScope::All, true).expect("dry run");
    let LineDisposition::Updated { updates } = &outcomes[0].disposition else {
        panic!("expected a plan");
    };
    assert!(updates
        .iter()
        .all(|u| matches!(u, UpdateOutcome::WouldApply { .. })));

    assert_eq!(commit_count(fx.mirror_root()), base);
    assert_eq!(
        checkpoint::read(fx.mirror_root(), &ReleaseLine::from("5.4.x")).expect("read"),
        None
    );
    assert!(!fx.mirror_root().join("5.4.x").exists());
}

#[test]
fn export_failure_aborts_run_and_preserves_progress() {
    let fx = Fixture::with_failing_tag(
        &["v5.4.9", "v5.4.10", "v5.10.1"],
        &["5.4.x", "5.10.x"],
        Some("v5.4.10"),
    );
    let line = ReleaseLine::from("5.4.x");
    let base = commit_count(fx.mirror_root());

    let err = fx.run(UpdateScope::All, false).expect_err("export failure");
    assert!(matches!(err, MirrorError::ExportFailed { .. }));

    // v5.4.9 landed and was checkpointed; v5.4.10 left no checkpoint; the
    // 5.10.x line after the failure was never attempted.
    assert_eq!(commit_count(fx.mirror_root()), base + 1);
    assert_eq!(
        checkpoint::read(fx.mirror_root(), &line).expect("read"),
        Some("v5.4.9".to_string())
    );
    assert!(!fx.mirror_root().join("5.10.x").exists());
}

#[test]
fn line_scope_must_be_configured() {
    let fx = Fixture::new(&["v5.4.9"], &["5.4.x"]);
    let err = fx
        .run(UpdateScope::Line(ReleaseLine::from("6.1.x")), false)
        .expect_err("unknown line");
    assert!(matches!(err, MirrorError::UnknownLine { .. }));
}

#[test]
fn line_with_no_upstream_tags_is_reported_not_failed() {
    let fx = Fixture::new(&["v5.4.9"], &["5.4.x", "6.6.x"]);
    let outcomes = fx.run(UpdateScope::All, false).expect("run");
    assert!(matches!(outcomes[1].disposition, LineDisposition::NoTags));
}

#[test]
fn malformed_checkpoint_token_is_fatal() {
    let fx = Fixture::new(&["v5.4.9", "v5.4.10"], &["5.4.x"]);
    let line_dir = fx.mirror_root().join("5.4.x");
    std::fs::create_dir_all(&line_dir).expect("line dir");
    std::fs::write(line_dir.join(".version"), "not-a-tag\n").expect("corrupt checkpoint");

    let err = fx.run(UpdateScope::All, false).expect_err("malformed token");
    assert!(matches!(err, MirrorError::Tag(_)));
}
