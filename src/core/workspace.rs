//! core::workspace
//!
//! Exclusively-owned temporary directory for one run.
//!
//! # Invariants
//!
//! - Each acquisition creates a new, uniquely named directory
//! - The directory tree is removed exactly once: by an explicit
//!   [`ScopedWorkspace::release`], or when the guard is dropped (RAII)
//! - `release` is idempotent; calling it again is a no-op
//!
//! A process killed by the host before release leaves the directory behind.
//! Nothing here attempts to collect such orphans.
//!
//! # Example
//!
//! ```
//! use feature_gates::core::workspace::ScopedWorkspace;
//!
//! let root = std::env::temp_dir();
//! let mut workspace = ScopedWorkspace::acquire(&root).unwrap();
//! let path = workspace.path().to_path_buf();
//! assert!(path.is_dir());
//!
//! workspace.release().unwrap();
//! workspace.release().unwrap();
//! assert!(!path.exists());
//! ```

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use thiserror::Error;

/// Prefix of every workspace directory name.
pub const WORKSPACE_PREFIX: &str = "feature-gates-";

/// Errors from workspace operations.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    /// The scoped directory could not be created.
    #[error("unable to create temp work dir under '{root}': {source}")]
    Create {
        root: PathBuf,
        source: std::io::Error,
    },

    /// The directory tree could not be removed.
    #[error("unable to remove temp work dir '{path}': {source}")]
    Release {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Platform-appropriate root for workspaces.
///
/// macOS uses `/tmp` rather than the per-user `$TMPDIR`; everything else uses
/// the platform default.
pub fn default_root() -> PathBuf {
    if cfg!(target_os = "macos") {
        PathBuf::from("/tmp")
    } else {
        std::env::temp_dir()
    }
}

/// A temporary directory owned by a single run.
#[derive(Debug)]
pub struct ScopedWorkspace {
    path: PathBuf,
    /// `Some` until released.
    dir: Option<TempDir>,
}

impl ScopedWorkspace {
    /// Create a uniquely named directory under `root`.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError::Create`] if the directory cannot be created
    /// (missing root, permissions, disk exhaustion). Nothing is left behind
    /// in that case.
    pub fn acquire(root: &Path) -> Result<Self, WorkspaceError> {
        let dir = tempfile::Builder::new()
            .prefix(WORKSPACE_PREFIX)
            .tempdir_in(root)
            .map_err(|source| WorkspaceError::Create {
                root: root.to_path_buf(),
                source,
            })?;

        Ok(Self {
            path: dir.path().to_path_buf(),
            dir: Some(dir),
        })
    }

    /// Path of the workspace directory.
    ///
    /// Still valid after release, but then names a directory that no longer exists.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the directory has been released.
    pub fn is_released(&self) -> bool {
        self.dir.is_none()
    }

    /// Recursively remove the workspace directory.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError::Release`] if removal fails. The guard counts
    /// as released either way; it never retries.
    pub fn release(&mut self) -> Result<(), WorkspaceError> {
        match self.dir.take() {
            Some(dir) => dir.close().map_err(|source| WorkspaceError::Release {
                path: self.path.clone(),
                source,
            }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn acquire_creates_prefixed_directory() {
        let root = TempDir::new().expect("create root");
        let workspace = ScopedWorkspace::acquire(root.path()).expect("acquire");

        assert!(workspace.path().is_dir());
        assert!(workspace.path().starts_with(root.path()));
        let name = workspace.path().file_name().unwrap().to_string_lossy();
        assert!(name.starts_with(WORKSPACE_PREFIX));
        assert!(!workspace.is_released());
    }

    #[test]
    fn acquisitions_are_unique() {
        let root = TempDir::new().expect("create root");
        let a = ScopedWorkspace::acquire(root.path()).expect("acquire a");
        let b = ScopedWorkspace::acquire(root.path()).expect("acquire b");
        assert_ne!(a.path(), b.path());
    }

    #[test]
    fn release_removes_nested_tree() {
        let root = TempDir::new().expect("create root");
        let mut workspace = ScopedWorkspace::acquire(root.path()).expect("acquire");
        let nested = workspace.path().join("repo/deep/dir");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(nested.join("file.yaml"), "- name: Foo\n").unwrap();

        let path = workspace.path().to_path_buf();
        workspace.release().expect("release");

        assert!(!path.exists());
        assert!(workspace.is_released());
    }

    #[test]
    fn release_is_idempotent() {
        let root = TempDir::new().expect("create root");
        let mut workspace = ScopedWorkspace::acquire(root.path()).expect("acquire");
        workspace.release().expect("first release");
        workspace.release().expect("second release");
    }

    #[test]
    fn drop_releases() {
        let root = TempDir::new().expect("create root");
        let path = {
            let workspace = ScopedWorkspace::acquire(root.path()).expect("acquire");
            workspace.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[test]
    fn missing_root_fails_without_side_effects() {
        let root = TempDir::new().expect("create root");
        let missing = root.path().join("does-not-exist");

        let result = ScopedWorkspace::acquire(&missing);

        assert!(matches!(result, Err(WorkspaceError::Create { .. })));
        assert!(!missing.exists());
    }

    #[test]
    fn default_root_exists() {
        assert!(default_root().is_dir());
    }
}
