//! core::config
//!
//! Configuration schema and loading.
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Built-in defaults (the upstream Kubernetes repository)
//! 2. Configuration file
//! 3. CLI flags ([`Overrides`])
//!
//! # Config File Locations
//!
//! An explicit `--config <file>` must exist. Otherwise these are searched in
//! order, and a missing file is not an error:
//! 1. `$FEATURE_GATES_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/feature-gates/config.toml`
//! 3. `~/.feature-gates/config.toml`
//!
//! # Example
//!
//! ```no_run
//! use feature_gates::core::config::{Config, Overrides};
//!
//! let loaded = Config::load(None).unwrap();
//! let source = loaded.config.resolve(&Overrides::default()).unwrap();
//! println!("fetching {} @ {}", source.repo_url, source.branch);
//! ```

pub mod schema;

pub use schema::{FileConfig, SourceSection, WorkspaceSection};

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::types::BranchName;
use crate::core::workspace;

/// Upstream repository fetched when nothing else is configured.
pub const DEFAULT_REPO_URL: &str = "https://github.com/kubernetes/kubernetes.git";

/// Branch fetched when nothing else is configured.
pub const DEFAULT_BRANCH: &str = "master";

/// Location of the versioned feature list inside the repository.
pub const DEFAULT_DOCUMENT_PATH: &str =
    "test/compatibility_lifecycle/reference/versioned_feature_list.yaml";

/// Directory inside the workspace the repository is cloned into.
pub const DEFAULT_CHECKOUT_DIR: &str = "kubernetes";

/// Environment variable naming a config file.
pub const CONFIG_ENV: &str = "FEATURE_GATES_CONFIG";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("config file not found: {0}")]
    NotFound(PathBuf),

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Where to look for a config file.
///
/// Captured once from the process environment so loading itself stays a
/// pure function of its inputs.
#[derive(Debug, Clone, Default)]
pub struct ConfigSearch {
    /// Value of `$FEATURE_GATES_CONFIG`
    pub env_config: Option<PathBuf>,
    /// Value of `$XDG_CONFIG_HOME`
    pub xdg_config_home: Option<PathBuf>,
    /// The user's home directory
    pub home: Option<PathBuf>,
}

impl ConfigSearch {
    /// Read search locations from the process environment.
    pub fn from_env() -> Self {
        Self {
            env_config: std::env::var_os(CONFIG_ENV).map(PathBuf::from),
            xdg_config_home: std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
            home: dirs::home_dir(),
        }
    }

    /// Candidate files, in search order.
    pub fn candidates(&self) -> Vec<PathBuf> {
        let mut candidates = Vec::new();
        if let Some(path) = &self.env_config {
            candidates.push(path.clone());
        }
        if let Some(xdg) = &self.xdg_config_home {
            candidates.push(xdg.join("feature-gates/config.toml"));
        }
        if let Some(home) = &self.home {
            candidates.push(home.join(".feature-gates/config.toml"));
        }
        candidates
    }
}

/// Result of loading configuration.
#[derive(Debug)]
pub struct ConfigLoadResult {
    /// The loaded configuration.
    pub config: Config,
}

/// Values supplied on the command line. `None` defers to the file or default.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub repo_url: Option<String>,
    pub branch: Option<String>,
    pub document_path: Option<PathBuf>,
    pub workspace_root: Option<PathBuf>,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceConfig {
    /// URL handed to `git clone`
    pub repo_url: String,
    /// Branch to snapshot
    pub branch: BranchName,
    /// Gate document path relative to the repository root
    pub document_path: PathBuf,
    /// Directory inside the workspace the repository is cloned into
    pub checkout_dir: String,
    /// Directory under which the workspace is created
    pub workspace_root: PathBuf,
}

/// Configuration loaded from a file, if any.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// File contents (defaults when no file was found)
    pub file: FileConfig,
    /// Path the file was loaded from
    loaded_from: Option<PathBuf>,
}

impl Config {
    /// Load configuration.
    ///
    /// With `explicit`, that file must exist. Otherwise the standard
    /// locations from the process environment are searched.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be read, parsed
    /// or validated, or if an explicit file is missing.
    pub fn load(explicit: Option<&Path>) -> Result<ConfigLoadResult, ConfigError> {
        match explicit {
            Some(path) => {
                if !path.is_file() {
                    return Err(ConfigError::NotFound(path.to_path_buf()));
                }
                Self::load_file(path)
            }
            None => Self::load_with(&ConfigSearch::from_env()),
        }
    }

    /// Load configuration from the first existing candidate of `search`.
    pub fn load_with(search: &ConfigSearch) -> Result<ConfigLoadResult, ConfigError> {
        match search.candidates().into_iter().find(|p| p.is_file()) {
            Some(path) => Self::load_file(&path),
            None => Ok(ConfigLoadResult {
                config: Config::default(),
            }),
        }
    }

    fn load_file(path: &Path) -> Result<ConfigLoadResult, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let file: FileConfig = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        file.validate()?;

        Ok(ConfigLoadResult {
            config: Config {
                file,
                loaded_from: Some(path.to_path_buf()),
            },
        })
    }

    /// Get the path to the loaded config file.
    pub fn loaded_from(&self) -> Option<&Path> {
        self.loaded_from.as_deref()
    }

    /// Merge defaults, file values and CLI overrides into run settings.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if an override is invalid.
    pub fn resolve(&self, overrides: &Overrides) -> Result<SourceConfig, ConfigError> {
        let source = self.file.source.clone().unwrap_or_default();
        let workspace_section = self.file.workspace.clone().unwrap_or_default();

        let repo_url = overrides
            .repo_url
            .clone()
            .or(source.repo_url)
            .unwrap_or_else(|| DEFAULT_REPO_URL.to_string());
        schema::validate_repo_url(&repo_url)?;

        let branch = overrides
            .branch
            .clone()
            .or(source.branch)
            .unwrap_or_else(|| DEFAULT_BRANCH.to_string());
        let branch = BranchName::new(branch)
            .map_err(|e| ConfigError::InvalidValue(format!("branch: {}", e)))?;

        let document_path = overrides
            .document_path
            .clone()
            .or(source.document_path)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DOCUMENT_PATH));
        schema::validate_document_path(&document_path)?;

        let checkout_dir = source
            .checkout_dir
            .unwrap_or_else(|| DEFAULT_CHECKOUT_DIR.to_string());
        schema::validate_checkout_dir(&checkout_dir)?;

        let workspace_root = overrides
            .workspace_root
            .clone()
            .or(workspace_section.root)
            .unwrap_or_else(workspace::default_root);

        Ok(SourceConfig {
            repo_url,
            branch,
            document_path,
            checkout_dir,
            workspace_root,
        })
    }
}
