//! git::fetch
//!
//! Retrieval of an upstream snapshot into a workspace.
//!
//! # Contract
//!
//! A fetch is a single shallow (depth 1), single-branch clone into the fixed
//! checkout directory of the workspace. There is no retry: a failed clone is
//! returned to the caller, which still owns (and must release) the workspace.
//!
//! The clone runs with the workspace as the child's working directory. The
//! parent process never changes its own current directory.
//!
//! # Example
//!
//! ```ignore
//! use feature_gates::git::{GitCliFetcher, SourceFetcher};
//!
//! let fetched = GitCliFetcher::new().fetch(&paths, &config.repo_url, &config.branch)?;
//! println!("fetched {} into {}", fetched.snapshot.commit, fetched.root.display());
//! ```

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};

use thiserror::Error;

use super::interface::{Git, GitError, Snapshot};
use crate::core::paths::SourcePaths;
use crate::core::types::BranchName;

/// Errors from retrieving the upstream snapshot.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The retrieval command could not be started.
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    /// The retrieval command exited non-zero.
    #[error("failed cloning {repo_url} ({status}){}", format_stderr(.stderr))]
    CommandFailed {
        repo_url: String,
        status: ExitStatus,
        stderr: String,
    },

    /// The clone reported success but the checkout is unusable.
    #[error("fetched snapshot at '{path}' is unusable: {source}")]
    Inspect { path: PathBuf, source: GitError },

    /// The snapshot is not on the requested branch.
    #[error("fetched snapshot is on {actual}, expected branch {expected}")]
    BranchMismatch { expected: String, actual: String },
}

fn format_stderr(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {}", trimmed)
    }
}

/// A snapshot retrieved into a workspace.
#[derive(Debug, Clone)]
pub struct FetchedSource {
    /// Root of the checkout (always `SourcePaths::checkout_root`)
    pub root: PathBuf,
    /// What was checked out
    pub snapshot: Snapshot,
}

/// Retrieves an upstream repository snapshot.
///
/// Implementations must place the snapshot at `paths.checkout_root()` and
/// must not touch anything outside `paths.workspace()`.
pub trait SourceFetcher {
    fn fetch(
        &self,
        paths: &SourcePaths,
        repo_url: &str,
        branch: &BranchName,
    ) -> Result<FetchedSource, FetchError>;
}

/// Fetches by running `git clone --depth=1 --single-branch`.
#[derive(Debug, Clone)]
pub struct GitCliFetcher {
    program: PathBuf,
}

impl Default for GitCliFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl GitCliFetcher {
    /// Use the `git` found on `PATH`.
    pub fn new() -> Self {
        Self {
            program: PathBuf::from("git"),
        }
    }

    /// Use a specific git executable.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Arguments for the clone, relative to the workspace directory.
    pub fn clone_args(paths: &SourcePaths, repo_url: &str, branch: &BranchName) -> Vec<OsString> {
        vec![
            "clone".into(),
            "--quiet".into(),
            "--depth=1".into(),
            "--single-branch".into(),
            "--branch".into(),
            branch.as_str().into(),
            // Everything after "--" is positional, never an option.
            "--".into(),
            repo_url.into(),
            paths.checkout_dir().as_os_str().to_os_string(),
        ]
    }
}

impl SourceFetcher for GitCliFetcher {
    fn fetch(
        &self,
        paths: &SourcePaths,
        repo_url: &str,
        branch: &BranchName,
    ) -> Result<FetchedSource, FetchError> {
        let output = Command::new(&self.program)
            .args(Self::clone_args(paths, repo_url, branch))
            .current_dir(paths.workspace())
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .output()
            .map_err(|source| FetchError::Spawn {
                program: self.program.display().to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(FetchError::CommandFailed {
                repo_url: repo_url.to_string(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        let root = paths.checkout_root().to_path_buf();
        let inspect = |source| FetchError::Inspect {
            path: root.clone(),
            source,
        };
        let snapshot = Git::open(&root)
            .and_then(|git| git.snapshot())
            .map_err(inspect)?;

        match &snapshot.branch {
            Some(actual) if actual == branch => {}
            other => {
                return Err(FetchError::BranchMismatch {
                    expected: branch.to_string(),
                    actual: other
                        .as_ref()
                        .map(|b| format!("branch {}", b))
                        .unwrap_or_else(|| "a detached HEAD".to_string()),
                })
            }
        }

        Ok(FetchedSource { root, snapshot })
    }
}
