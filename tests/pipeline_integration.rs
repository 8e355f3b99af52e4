//! Integration tests for the run pipeline.
//!
//! These tests clone real local repositories over `file://` and verify that
//! the gate list comes back intact and that no workspace outlives a run.

use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

use feature_gates::core::config::{
    Config, Overrides, SourceConfig, SourceSection, DEFAULT_DOCUMENT_PATH,
};
use feature_gates::engine::{run_once, Context, PipelineError, SystemProbe};
use feature_gates::gates::ParseError;
use feature_gates::git::{FetchError, GitCliFetcher};

const FOO: &str = r#"- name: Foo
  versionedSpecs:
    - {default: false, lockToDefault: false, preRelease: Alpha, version: "1.20"}
    - {default: true,  lockToDefault: true,  preRelease: GA,    version: "1.25"}
"#;

const STABLE: &str = r#"- name: Foo
  versionedSpecs:
    - {default: false, lockToDefault: false, preRelease: Alpha, version: "1.20"}
- name: Bar
  versionedSpecs:
    - {default: false, lockToDefault: false, preRelease: Beta, version: "1.20"}
    - {default: true, lockToDefault: false, preRelease: "Stable", version: "1.22"}
"#;

/// Upstream repository holding a gate document at the default path.
struct TestUpstream {
    dir: TempDir,
}

impl TestUpstream {
    fn with_document(document: &str) -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        run_git(dir.path(), &["init", "-b", "main"]);
        run_git(dir.path(), &["config", "user.email", "test@example.com"]);
        run_git(dir.path(), &["config", "user.name", "Test User"]);

        std::fs::write(dir.path().join("README.md"), "# Upstream\n").unwrap();
        run_git(dir.path(), &["add", "README.md"]);
        run_git(dir.path(), &["commit", "-m", "Initial commit"]);

        let upstream = Self { dir };
        upstream.commit_document(document, "Add feature list");
        upstream
    }

    fn commit_document(&self, document: &str, message: &str) {
        let path = self.dir.path().join(DEFAULT_DOCUMENT_PATH);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, document).unwrap();
        run_git(self.dir.path(), &["add", "."]);
        run_git(self.dir.path(), &["commit", "-m", message]);
    }

    fn url(&self) -> String {
        format!("file://{}", self.dir.path().display())
    }

    fn head(&self) -> String {
        let output = Command::new("git")
            .args(["rev-parse", "HEAD"])
            .current_dir(self.dir.path())
            .output()
            .expect("git rev-parse failed");
        String::from_utf8(output.stdout).unwrap().trim().to_string()
    }
}

fn run_git(dir: &Path, args: &[&str]) {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("git command failed");

    if !output.status.success() {
        panic!(
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
    }
}

fn source(upstream: &TestUpstream, root: &Path) -> SourceConfig {
    Config::default()
        .resolve(&Overrides {
            repo_url: Some(upstream.url()),
            branch: Some("main".into()),
            workspace_root: Some(root.to_path_buf()),
            ..Default::default()
        })
        .unwrap()
}

fn quiet() -> Context {
    Context {
        debug: false,
        quiet: true,
    }
}

fn leftovers(root: &Path) -> Vec<PathBuf> {
    std::fs::read_dir(root)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect()
}

// =============================================================================
// Success
// =============================================================================

#[test]
fn foo_scenario_end_to_end() {
    let upstream = TestUpstream::with_document(FOO);
    let root = TempDir::new().unwrap();

    let report = run_once(
        source(&upstream, root.path()),
        GitCliFetcher::new(),
        &SystemProbe,
        &quiet(),
    )
    .expect("run");

    assert_eq!(report.gates.len(), 1);
    let foo = &report.gates[0];
    assert_eq!(foo.name(), "Foo");
    let specs = foo.versioned_specs();
    assert_eq!(specs.len(), 2);
    assert_eq!(specs[0].version(), "1.20");
    assert!(!specs[0].default());
    assert!(specs[1].lock_to_default());
    assert!(specs[1].effective_value(Some(false)));

    assert_eq!(report.source.commit.as_str(), upstream.head());
    assert!(report.source.shallow);
    assert!(report.warnings.is_empty());
    assert!(leftovers(root.path()).is_empty(), "workspace left behind");
}

#[test]
fn rerun_against_same_commit_is_identical() {
    let upstream = TestUpstream::with_document(FOO);
    let root = TempDir::new().unwrap();

    let first = run_once(
        source(&upstream, root.path()),
        GitCliFetcher::new(),
        &SystemProbe,
        &quiet(),
    )
    .unwrap();
    let second = run_once(
        source(&upstream, root.path()),
        GitCliFetcher::new(),
        &SystemProbe,
        &quiet(),
    )
    .unwrap();

    assert_eq!(first.gates, second.gates);
    assert_eq!(first.document_digest, second.document_digest);
    assert_eq!(first.source.commit, second.source.commit);
    assert!(leftovers(root.path()).is_empty());
}

#[test]
fn picks_up_latest_upstream_commit() {
    let upstream = TestUpstream::with_document(FOO);
    let root = TempDir::new().unwrap();
    upstream.commit_document(
        &format!(
            "{FOO}- name: Bar\n  versionedSpecs:\n    - {{default: true, lockToDefault: false, preRelease: Beta, version: \"1.31\"}}\n"
        ),
        "Add Bar",
    );

    let report = run_once(
        source(&upstream, root.path()),
        GitCliFetcher::new(),
        &SystemProbe,
        &quiet(),
    )
    .unwrap();

    let names: Vec<_> = report.gates.iter().map(|g| g.name()).collect();
    assert_eq!(names, vec!["Foo", "Bar"]);
    assert_eq!(report.source.commit.as_str(), upstream.head());
}

#[test]
fn configured_checkout_dir_is_used() {
    let upstream = TestUpstream::with_document(FOO);
    let root = TempDir::new().unwrap();
    let mut config = Config::default();
    config.file.source = Some(SourceSection {
        checkout_dir: Some("k8s".into()),
        ..Default::default()
    });

    let source = config
        .resolve(&Overrides {
            repo_url: Some(upstream.url()),
            branch: Some("main".into()),
            workspace_root: Some(root.path().to_path_buf()),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(source.checkout_dir, "k8s");

    let report = run_once(source, GitCliFetcher::new(), &SystemProbe, &quiet()).unwrap();
    assert_eq!(report.gates.len(), 1);
    assert!(leftovers(root.path()).is_empty());
}

// =============================================================================
// Failure cleanup
// =============================================================================

#[test]
fn stable_scenario_fails_and_cleans_up() {
    let upstream = TestUpstream::with_document(STABLE);
    let root = TempDir::new().unwrap();

    let err = run_once(
        source(&upstream, root.path()),
        GitCliFetcher::new(),
        &SystemProbe,
        &quiet(),
    )
    .unwrap_err();

    match &err {
        PipelineError::Parse(ParseError::MalformedSpec { gate, index, .. }) => {
            assert_eq!(gate, "Bar");
            assert_eq!(*index, 1);
        }
        other => panic!("expected MalformedSpec, got {other:?}"),
    }
    assert!(leftovers(root.path()).is_empty(), "workspace left behind");
}

#[test]
fn unknown_branch_fails_and_cleans_up() {
    let upstream = TestUpstream::with_document(FOO);
    let root = TempDir::new().unwrap();
    let source = Config::default()
        .resolve(&Overrides {
            repo_url: Some(upstream.url()),
            branch: Some("release-9.99".into()),
            workspace_root: Some(root.path().to_path_buf()),
            ..Default::default()
        })
        .unwrap();

    let err = run_once(source, GitCliFetcher::new(), &SystemProbe, &quiet()).unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Fetch(FetchError::CommandFailed { .. })
    ));
    assert!(err.to_string().contains("failed cloning"));
    assert!(leftovers(root.path()).is_empty(), "workspace left behind");
}

#[test]
fn unreachable_repository_fails_and_cleans_up() {
    let root = TempDir::new().unwrap();
    let missing = root.path().join("no-such-repo");
    let scratch = TempDir::new().unwrap();
    let source = Config::default()
        .resolve(&Overrides {
            repo_url: Some(format!("file://{}", missing.display())),
            workspace_root: Some(scratch.path().to_path_buf()),
            ..Default::default()
        })
        .unwrap();

    let err = run_once(source, GitCliFetcher::new(), &SystemProbe, &quiet()).unwrap_err();

    assert!(matches!(err, PipelineError::Fetch(_)));
    assert!(leftovers(scratch.path()).is_empty(), "workspace left behind");
}

#[test]
fn missing_document_fails_and_cleans_up() {
    let upstream = TestUpstream::with_document(FOO);
    let root = TempDir::new().unwrap();
    let source = Config::default()
        .resolve(&Overrides {
            repo_url: Some(upstream.url()),
            branch: Some("main".into()),
            document_path: Some(PathBuf::from("not/here.yaml")),
            workspace_root: Some(root.path().to_path_buf()),
        })
        .unwrap();

    let err = run_once(source, GitCliFetcher::new(), &SystemProbe, &quiet()).unwrap_err();

    assert!(matches!(err, PipelineError::Parse(ParseError::Read { .. })));
    assert!(leftovers(root.path()).is_empty(), "workspace left behind");
}

#[test]
fn missing_workspace_root_is_precondition_failure() {
    let upstream = TestUpstream::with_document(FOO);
    let root = TempDir::new().unwrap();
    let absent = root.path().join("absent");

    let err = run_once(
        source(&upstream, &absent),
        GitCliFetcher::new(),
        &SystemProbe,
        &quiet(),
    )
    .unwrap_err();

    assert!(matches!(err, PipelineError::Precondition(_)));
    assert!(err.to_string().contains("absent"));
    assert!(!absent.exists());
}
