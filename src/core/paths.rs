//! core::paths
//!
//! Centralized path routing inside a run's workspace.
//!
//! # Layout
//!
//! ```text
//! <workspace>/                      scoped temporary directory
//! <workspace>/<checkout_dir>/       root of the fetched snapshot
//! <workspace>/<checkout_dir>/<document_path>
//! ```
//!
//! **Hard rule:** no other module joins workspace paths by hand. The fetcher
//! clones into [`SourcePaths::checkout_root`] and the parser reads
//! [`SourcePaths::document`]; both fixed subpaths come from configuration,
//! never from globbing the workspace.
//!
//! # Example
//!
//! ```
//! use feature_gates::core::paths::SourcePaths;
//! use std::path::{Path, PathBuf};
//!
//! let paths = SourcePaths::new(
//!     PathBuf::from("/tmp/feature-gates-abc"),
//!     "kubernetes",
//!     "test/compatibility_lifecycle/reference/versioned_feature_list.yaml",
//! );
//!
//! assert_eq!(paths.checkout_root(), Path::new("/tmp/feature-gates-abc/kubernetes"));
//! assert_eq!(
//!     paths.document(),
//!     PathBuf::from("/tmp/feature-gates-abc/kubernetes/test/compatibility_lifecycle/reference/versioned_feature_list.yaml")
//! );
//! ```

use std::path::{Path, PathBuf};

/// Path routing for one workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePaths {
    workspace: PathBuf,
    checkout_root: PathBuf,
    document_path: PathBuf,
}

impl SourcePaths {
    /// Route paths for a workspace.
    ///
    /// `checkout_dir` is the single directory the snapshot is cloned into;
    /// `document_path` is relative to the snapshot root.
    pub fn new(
        workspace: PathBuf,
        checkout_dir: impl AsRef<Path>,
        document_path: impl AsRef<Path>,
    ) -> Self {
        let checkout_root = workspace.join(checkout_dir);
        Self {
            workspace,
            checkout_root,
            document_path: document_path.as_ref().to_path_buf(),
        }
    }

    /// The workspace directory itself.
    pub fn workspace(&self) -> &Path {
        &self.workspace
    }

    /// Root of the fetched repository snapshot.
    pub fn checkout_root(&self) -> &Path {
        &self.checkout_root
    }

    /// Name of the checkout directory, relative to the workspace.
    ///
    /// This is what the clone command is given, since it runs with the
    /// workspace as its working directory.
    pub fn checkout_dir(&self) -> &Path {
        self.checkout_root
            .strip_prefix(&self.workspace)
            .unwrap_or(&self.checkout_root)
    }

    /// The gate document's path relative to the snapshot root.
    pub fn document_path(&self) -> &Path {
        &self.document_path
    }

    /// Absolute path of the gate document.
    pub fn document(&self) -> PathBuf {
        self.checkout_root.join(&self.document_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkout_dir_is_relative_to_workspace() {
        let paths = SourcePaths::new(PathBuf::from("/w"), "kubernetes", "doc.yaml");
        assert_eq!(paths.checkout_dir(), Path::new("kubernetes"));
        assert_eq!(paths.workspace(), Path::new("/w"));
    }

    #[test]
    fn document_lives_under_checkout() {
        let paths = SourcePaths::new(PathBuf::from("/w"), "repo", "a/b/list.yaml");
        assert_eq!(paths.document(), PathBuf::from("/w/repo/a/b/list.yaml"));
        assert_eq!(paths.document_path(), Path::new("a/b/list.yaml"));
    }
}
