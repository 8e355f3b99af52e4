//! engine::pipeline
//!
//! The run pipeline: acquire workspace, fetch, parse, release.
//!
//! # State Machine
//!
//! ```text
//! Idle -> WorkspaceAcquired -> Fetched -> Parsed -> Done
//!   |            |               |          |
//!   +------------+---------------+----------+--> Error
//! ```
//!
//! # Invariants
//!
//! - Once a workspace is acquired it is released before `run` returns,
//!   whichever state the run ends in
//! - Steps run strictly in sequence; none starts before the previous ends
//! - Either the full gate list is returned or an error is; never both
//! - A pipeline runs at most once
//!
//! # Example
//!
//! ```ignore
//! use feature_gates::engine::{Context, Pipeline};
//! use feature_gates::git::GitCliFetcher;
//!
//! let mut pipeline = Pipeline::new(source_config, GitCliFetcher::new(), &Context::default());
//! let report = pipeline.run()?;
//! assert_eq!(pipeline.state(), PipelineState::Done);
//! ```

use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use super::preconditions::UnmetRequirement;
use super::Context;
use crate::core::config::SourceConfig;
use crate::core::gate::FeatureGate;
use crate::core::paths::SourcePaths;
use crate::core::types::{BranchName, DocumentDigest, Oid, UtcTimestamp};
use crate::core::workspace::{ScopedWorkspace, WorkspaceError};
use crate::gates::{self, ParseError, ParseWarning};
use crate::git::{FetchError, SourceFetcher};
use crate::ui::output::{self, Verbosity};

/// Errors that end a run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Preconditions were not met; nothing was touched.
    #[error("{}", format_unmet(.0))]
    Precondition(Vec<UnmetRequirement>),

    #[error(transparent)]
    Workspace(#[from] WorkspaceError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    /// `run` was called on a pipeline that already ran.
    #[error("pipeline has already run (state: {0:?})")]
    AlreadyRun(PipelineState),
}

fn format_unmet(unmet: &[UnmetRequirement]) -> String {
    unmet
        .iter()
        .map(|u| u.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

/// States of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PipelineState {
    Idle,
    WorkspaceAcquired,
    Fetched,
    Parsed,
    Done,
    Error,
}

/// Where the gates came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceDescriptor {
    pub repo_url: String,
    pub branch: BranchName,
    pub commit: Oid,
    pub document_path: PathBuf,
    pub shallow: bool,
}

/// Everything a successful run produced.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub source: SourceDescriptor,
    pub document_digest: DocumentDigest,
    pub fetched_at: UtcTimestamp,
    pub gates: Vec<FeatureGate>,
    pub warnings: Vec<ParseWarning>,
}

/// One fetch-and-parse run.
pub struct Pipeline<F: SourceFetcher> {
    config: SourceConfig,
    fetcher: F,
    verbosity: Verbosity,
    state: PipelineState,
    history: Vec<PipelineState>,
    workspace_path: Option<PathBuf>,
}

impl<F: SourceFetcher> Pipeline<F> {
    pub fn new(config: SourceConfig, fetcher: F, ctx: &Context) -> Self {
        Self {
            config,
            fetcher,
            verbosity: ctx.verbosity(),
            state: PipelineState::Idle,
            history: vec![PipelineState::Idle],
            workspace_path: None,
        }
    }

    /// Current state.
    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Every state entered so far, starting with `Idle`.
    pub fn history(&self) -> &[PipelineState] {
        &self.history
    }

    /// Path of the workspace this run acquired, if it got that far.
    ///
    /// After `run` returns, the directory no longer exists.
    pub fn workspace_path(&self) -> Option<&Path> {
        self.workspace_path.as_deref()
    }

    fn transition(&mut self, next: PipelineState) {
        output::debug(format!("pipeline: {:?} -> {:?}", self.state, next), self.verbosity);
        self.state = next;
        self.history.push(next);
    }

    fn fail<T>(&mut self, err: impl Into<PipelineError>) -> Result<T, PipelineError> {
        self.transition(PipelineState::Error);
        Err(err.into())
    }

    /// Execute the run.
    ///
    /// # Errors
    ///
    /// Returns the first failure. The workspace, if acquired, has been
    /// released by the time this returns.
    pub fn run(&mut self) -> Result<RunReport, PipelineError> {
        if self.state != PipelineState::Idle {
            return Err(PipelineError::AlreadyRun(self.state));
        }

        output::print("Making temp work dir", self.verbosity);
        let mut workspace = match ScopedWorkspace::acquire(&self.config.workspace_root) {
            Ok(workspace) => workspace,
            Err(err) => return self.fail(err),
        };
        self.workspace_path = Some(workspace.path().to_path_buf());
        self.transition(PipelineState::WorkspaceAcquired);
        output::print(
            format!("Working dir {}", workspace.path().display()),
            self.verbosity,
        );

        let outcome = self.fetch_and_parse(workspace.path());

        output::print("Work done, deleting temp work dir", self.verbosity);
        let released = workspace.release();

        match (outcome, released) {
            (Ok(report), Ok(())) => {
                self.transition(PipelineState::Done);
                Ok(report)
            }
            (Ok(_), Err(release_err)) => self.fail(release_err),
            (Err(err), Ok(())) => self.fail(err),
            (Err(err), Err(release_err)) => {
                output::warn(release_err, self.verbosity);
                self.fail(err)
            }
        }
    }

    /// The steps that run while the workspace is held.
    fn fetch_and_parse(&mut self, workspace: &Path) -> Result<RunReport, PipelineError> {
        let paths = SourcePaths::new(
            workspace.to_path_buf(),
            &self.config.checkout_dir,
            &self.config.document_path,
        );

        output::print(
            format!(
                "Cloning {} ({})...",
                self.config.repo_url, self.config.branch
            ),
            self.verbosity,
        );
        let fetched_at = UtcTimestamp::now();
        let fetched = self
            .fetcher
            .fetch(&paths, &self.config.repo_url, &self.config.branch)?;
        self.transition(PipelineState::Fetched);
        output::debug(
            format!(
                "fetched commit {} into {}",
                fetched.snapshot.commit,
                fetched.root.display()
            ),
            self.verbosity,
        );

        let document = paths.document();
        output::print(
            format!("Parsing {}", paths.document_path().display()),
            self.verbosity,
        );
        let parsed = gates::parse_file(&document)?;
        self.transition(PipelineState::Parsed);

        for warning in &parsed.warnings {
            output::warn(warning, self.verbosity);
        }
        output::print(
            format!("Parsed {} feature gates", parsed.gates.len()),
            self.verbosity,
        );

        Ok(RunReport {
            source: SourceDescriptor {
                repo_url: self.config.repo_url.clone(),
                branch: self.config.branch.clone(),
                commit: fetched.snapshot.commit,
                document_path: self.config.document_path.clone(),
                shallow: fetched.snapshot.shallow,
            },
            document_digest: parsed.digest,
            fetched_at,
            gates: parsed.gates,
            warnings: parsed.warnings,
        })
    }
}
