//! engine
//!
//! Orchestrates a run: Preconditions -> Workspace -> Fetch -> Parse -> Release.
//!
//! # Architecture
//!
//! 1. **Preconditions**: Confirm the host can perform a run, touching nothing
//! 2. **Workspace**: Acquire a uniquely named scratch directory
//! 3. **Fetch**: Shallow-clone the source branch into the workspace
//! 4. **Parse**: Decode the gate document into typed records
//! 5. **Release**: Remove the workspace, whatever happened before
//!
//! # Invariants
//!
//! - A failed precondition stops the run before any side effect
//! - The workspace never outlives the run
//! - Steps run one at a time, in order
//!
//! # Example
//!
//! ```ignore
//! use feature_gates::engine::{run_once, Context};
//! use feature_gates::engine::preconditions::SystemProbe;
//! use feature_gates::git::GitCliFetcher;
//!
//! let report = run_once(source_config, GitCliFetcher::new(), &SystemProbe, &Context::default())?;
//! println!("{} gates", report.gates.len());
//! ```

pub mod pipeline;
pub mod preconditions;

pub use pipeline::{Pipeline, PipelineError, PipelineState, RunReport, SourceDescriptor};
pub use preconditions::{Requirement, SystemProbe, ToolProbe, UnmetRequirement};

use crate::core::config::SourceConfig;
use crate::git::SourceFetcher;
use crate::ui::output::{self, Verbosity};

/// Execution context for a run.
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// Debug logging enabled.
    pub debug: bool,
    /// Quiet mode (minimal output).
    pub quiet: bool,
}

impl Context {
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.debug)
    }
}

/// Check preconditions, then run the pipeline once.
///
/// # Errors
///
/// [`PipelineError::Precondition`] lists every unmet requirement; nothing
/// has been created at that point. Any other error comes from the pipeline
/// after the workspace has already been released.
pub fn run_once<F: SourceFetcher>(
    config: SourceConfig,
    fetcher: F,
    probe: &dyn ToolProbe,
    ctx: &Context,
) -> Result<RunReport, PipelineError> {
    let unmet = preconditions::check(probe, &config);
    if !unmet.is_empty() {
        for item in &unmet {
            output::debug(
                format!("unmet requirement {}: {}", item.requirement.id(), item),
                ctx.verbosity(),
            );
        }
        return Err(PipelineError::Precondition(unmet));
    }

    Pipeline::new(config, fetcher, ctx).run()
}
