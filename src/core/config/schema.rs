//! core::config::schema
//!
//! Configuration file schema.
//!
//! # Example
//!
//! ```toml
//! [source]
//! repo_url = "https://github.com/kubernetes/kubernetes.git"
//! branch = "master"
//! document_path = "test/compatibility_lifecycle/reference/versioned_feature_list.yaml"
//! checkout_dir = "kubernetes"
//!
//! [workspace]
//! root = "/var/tmp"
//! ```
//!
//! # Validation
//!
//! Values are validated after parsing so a bad file fails before any
//! workspace is created.

use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::core::types::BranchName;

/// Contents of a configuration file. Every value is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Upstream repository settings
    pub source: Option<SourceSection>,

    /// Workspace settings
    pub workspace: Option<WorkspaceSection>,
}

impl FileConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(source) = &self.source {
            source.validate()?;
        }
        Ok(())
    }
}

/// The `[source]` table.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SourceSection {
    /// URL handed to `git clone`
    pub repo_url: Option<String>,

    /// Branch to snapshot
    pub branch: Option<String>,

    /// Gate document path, relative to the repository root
    pub document_path: Option<PathBuf>,

    /// Directory inside the workspace the repository is cloned into
    pub checkout_dir: Option<String>,
}

impl SourceSection {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(url) = &self.repo_url {
            validate_repo_url(url)?;
        }
        if let Some(branch) = &self.branch {
            BranchName::new(branch.as_str())
                .map_err(|e| ConfigError::InvalidValue(format!("source.branch: {}", e)))?;
        }
        if let Some(path) = &self.document_path {
            validate_document_path(path)?;
        }
        if let Some(dir) = &self.checkout_dir {
            validate_checkout_dir(dir)?;
        }
        Ok(())
    }
}

/// The `[workspace]` table.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct WorkspaceSection {
    /// Directory under which scoped workspaces are created
    pub root: Option<PathBuf>,
}

pub(crate) fn validate_repo_url(url: &str) -> Result<(), ConfigError> {
    if url.trim().is_empty() {
        return Err(ConfigError::InvalidValue(
            "source.repo_url cannot be empty".into(),
        ));
    }
    // Anything starting with '-' would reach git as an option.
    if url.starts_with('-') {
        return Err(ConfigError::InvalidValue(format!(
            "source.repo_url '{}' cannot start with '-'",
            url
        )));
    }
    Ok(())
}

pub(crate) fn validate_document_path(path: &Path) -> Result<(), ConfigError> {
    if path.as_os_str().is_empty() {
        return Err(ConfigError::InvalidValue(
            "source.document_path cannot be empty".into(),
        ));
    }
    let escapes = path
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes {
        return Err(ConfigError::InvalidValue(format!(
            "source.document_path '{}' must be relative and stay inside the repository",
            path.display()
        )));
    }
    Ok(())
}

pub(crate) fn validate_checkout_dir(dir: &str) -> Result<(), ConfigError> {
    let mut components = Path::new(dir).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) if !dir.starts_with('-') => Ok(()),
        _ => Err(ConfigError::InvalidValue(format!(
            "source.checkout_dir '{}' must be a single directory name",
            dir
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_valid() {
        let config: FileConfig = toml::from_str("").unwrap();
        assert_eq!(config, FileConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn full_file_parses() {
        let config: FileConfig = toml::from_str(
            r#"
            [source]
            repo_url = "https://example.com/repo.git"
            branch = "release-1.31"
            document_path = "docs/gates.yaml"
            checkout_dir = "repo"

            [workspace]
            root = "/var/tmp"
            "#,
        )
        .unwrap();

        let source = config.source.as_ref().unwrap();
        assert_eq!(source.branch.as_deref(), Some("release-1.31"));
        assert_eq!(
            config.workspace.unwrap().root,
            Some(PathBuf::from("/var/tmp"))
        );
        assert!(source.validate().is_ok());
    }

    #[test]
    fn unknown_keys_rejected() {
        let result: Result<FileConfig, _> = toml::from_str(
            r#"
            [source]
            retries = 3
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn invalid_branch_rejected() {
        let section = SourceSection {
            branch: Some("bad..branch".into()),
            ..Default::default()
        };
        assert!(section.validate().is_err());
    }

    #[test]
    fn escaping_document_path_rejected() {
        assert!(validate_document_path(Path::new("../outside.yaml")).is_err());
        assert!(validate_document_path(Path::new("/etc/passwd")).is_err());
        assert!(validate_document_path(Path::new("")).is_err());
        assert!(validate_document_path(Path::new("a/b/c.yaml")).is_ok());
    }

    #[test]
    fn checkout_dir_must_be_single_component() {
        assert!(validate_checkout_dir("kubernetes").is_ok());
        assert!(validate_checkout_dir("a/b").is_err());
        assert!(validate_checkout_dir("..").is_err());
        assert!(validate_checkout_dir("").is_err());
        assert!(validate_checkout_dir("-x").is_err());
    }

    #[test]
    fn option_like_repo_url_rejected() {
        assert!(validate_repo_url("--upload-pack=touch /tmp/x").is_err());
        assert!(validate_repo_url("  ").is_err());
        assert!(validate_repo_url("file:///srv/repo").is_ok());
    }
}
