//! engine::preconditions
//!
//! Requirements that must hold before a run may cause any side effect.
//!
//! # Architecture
//!
//! Checking is a pure function of a [`ToolProbe`] and the resolved
//! configuration: it returns the list of unmet requirements and touches
//! nothing. The caller short-circuits when the list is non-empty. There is
//! no accumulated global error state.
//!
//! # Example
//!
//! ```ignore
//! use feature_gates::engine::preconditions::{check, SystemProbe};
//!
//! let unmet = check(&SystemProbe, &source_config);
//! if !unmet.is_empty() {
//!     for item in &unmet {
//!         eprintln!("[Error] {}", item);
//!     }
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::core::config::SourceConfig;

/// A single precondition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Requirement {
    /// The `git` executable is discoverable on `PATH`.
    GitInstalled,

    /// The workspace root exists and is a directory.
    WorkspaceRootUsable,
}

impl Requirement {
    /// Stable identifier for machine-readable output.
    pub fn id(&self) -> &'static str {
        match self {
            Requirement::GitInstalled => "git-installed",
            Requirement::WorkspaceRootUsable => "workspace-root-usable",
        }
    }
}

/// A requirement that does not hold, with a human-readable explanation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnmetRequirement {
    pub requirement: Requirement,
    pub message: String,
}

impl std::fmt::Display for UnmetRequirement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Read-only view of the host environment.
pub trait ToolProbe {
    /// Locate an executable on the search path.
    fn find_program(&self, name: &str) -> Option<PathBuf>;

    /// Whether `path` is an existing directory.
    fn is_dir(&self, path: &Path) -> bool;
}

/// Probe backed by the real host.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProbe;

impl ToolProbe for SystemProbe {
    fn find_program(&self, name: &str) -> Option<PathBuf> {
        which::which(name).ok()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }
}

/// A named set of requirements.
#[derive(Debug, Clone)]
pub struct RequirementSet {
    pub requirements: &'static [Requirement],
    pub name: &'static str,
}

impl RequirementSet {
    pub const fn new(name: &'static str, requirements: &'static [Requirement]) -> Self {
        Self { requirements, name }
    }

    /// Evaluate every requirement, returning those that do not hold.
    pub fn missing(&self, probe: &dyn ToolProbe, config: &SourceConfig) -> Vec<UnmetRequirement> {
        self.requirements
            .iter()
            .filter_map(|requirement| evaluate(*requirement, probe, config))
            .collect()
    }
}

/// Predefined requirement sets.
pub mod requirements {
    use super::*;

    /// Everything a fetch-and-parse run needs.
    pub const RUN: RequirementSet = RequirementSet::new(
        "run",
        &[Requirement::GitInstalled, Requirement::WorkspaceRootUsable],
    );
}

/// Check everything a run needs. Empty means the run may proceed.
pub fn check(probe: &dyn ToolProbe, config: &SourceConfig) -> Vec<UnmetRequirement> {
    requirements::RUN.missing(probe, config)
}

fn evaluate(
    requirement: Requirement,
    probe: &dyn ToolProbe,
    config: &SourceConfig,
) -> Option<UnmetRequirement> {
    let message = match requirement {
        Requirement::GitInstalled => {
            if probe.find_program("git").is_some() {
                return None;
            }
            "Install git so the source repository can be cloned. https://git-scm.com/downloads"
                .to_string()
        }
        Requirement::WorkspaceRootUsable => {
            if probe.is_dir(&config.workspace_root) {
                return None;
            }
            format!(
                "Workspace root '{}' does not exist or is not a directory",
                config.workspace_root.display()
            )
        }
    };

    Some(UnmetRequirement {
        requirement,
        message,
    })
}
