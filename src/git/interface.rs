//! git::interface
//!
//! Read-only inspection of a fetched snapshot using git2.
//!
//! This is the only place `git2` is imported. The fetcher clones with the git
//! CLI, then hands the checkout to [`Git::open`] to learn which commit was
//! actually retrieved.
//!
//! # Error Handling
//!
//! Git errors are categorized into typed variants:
//! - [`GitError::NotARepo`]: Path is not inside a Git repository
//! - [`GitError::BareRepo`]: Repository has no working directory
//! - [`GitError::RefNotFound`]: HEAD is unborn or dangling
//!
//! # Example
//!
//! ```ignore
//! use feature_gates::git::Git;
//! use std::path::Path;
//!
//! let git = Git::open(Path::new("/tmp/feature-gates-abc/kubernetes"))?;
//! let snapshot = git.snapshot()?;
//! println!("parsed from {}", snapshot.commit.short(12));
//! ```

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::types::{BranchName, Oid, TypeError};

/// Errors from Git inspection.
#[derive(Debug, Error)]
pub enum GitError {
    /// Not inside a Git repository.
    #[error("not a git repository: {path}")]
    NotARepo {
        /// The path that was searched
        path: PathBuf,
    },

    /// Repository is bare (no working directory).
    #[error("bare repository not supported")]
    BareRepo,

    /// Requested ref does not exist.
    #[error("ref not found: {refname}")]
    RefNotFound {
        /// The ref that was not found
        refname: String,
    },

    /// Invalid object id format.
    #[error("invalid object id: {oid}")]
    InvalidOid {
        /// The invalid OID string
        oid: String,
    },

    /// Internal git2 error.
    #[error("git error: {message}")]
    Internal {
        /// The error message
        message: String,
    },
}

impl GitError {
    fn from_git2(err: git2::Error, context: &str) -> Self {
        match err.code() {
            git2::ErrorCode::NotFound | git2::ErrorCode::UnbornBranch => GitError::RefNotFound {
                refname: context.to_string(),
            },
            _ => GitError::Internal {
                message: format!("{}: {}", context, err.message()),
            },
        }
    }
}

impl From<TypeError> for GitError {
    fn from(err: TypeError) -> Self {
        GitError::InvalidOid {
            oid: err.to_string(),
        }
    }
}

/// What a fetched snapshot contains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// Commit checked out at HEAD
    pub commit: Oid,
    /// Branch HEAD points at, `None` when detached
    pub branch: Option<BranchName>,
    /// Whether history was truncated by a depth-limited clone
    pub shallow: bool,
}

/// Handle on a repository checkout.
pub struct Git {
    repo: git2::Repository,
}

impl std::fmt::Debug for Git {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Git")
            .field("path", &self.repo.path())
            .finish()
    }
}

impl Git {
    /// Open the repository rooted at `path`.
    ///
    /// Unlike discovery, this does not walk up parent directories: a
    /// checkout that failed to materialize must not resolve to some
    /// enclosing repository.
    ///
    /// # Errors
    ///
    /// - [`GitError::NotARepo`] if `path` is not a repository root
    /// - [`GitError::BareRepo`] if the repository has no working directory
    pub fn open(path: &Path) -> Result<Self, GitError> {
        let repo = git2::Repository::open(path).map_err(|_| GitError::NotARepo {
            path: path.to_path_buf(),
        })?;

        if repo.is_bare() {
            return Err(GitError::BareRepo);
        }

        Ok(Self { repo })
    }

    /// Get the commit HEAD points at.
    pub fn head_oid(&self) -> Result<Oid, GitError> {
        let head = self
            .repo
            .head()
            .map_err(|e| GitError::from_git2(e, "HEAD"))?;

        let oid = head
            .peel_to_commit()
            .map_err(|e| GitError::from_git2(e, "HEAD"))?
            .id();

        Ok(Oid::new(oid.to_string())?)
    }

    /// Get the current branch name, if on a branch.
    ///
    /// Returns `None` if HEAD is detached or unborn.
    pub fn current_branch(&self) -> Result<Option<BranchName>, GitError> {
        let head = match self.repo.head() {
            Ok(h) => h,
            Err(e) if e.code() == git2::ErrorCode::UnbornBranch => return Ok(None),
            Err(e) => return Err(GitError::from_git2(e, "HEAD")),
        };

        if !head.is_branch() {
            return Ok(None);
        }
        Ok(head.shorthand().and_then(|name| BranchName::new(name).ok()))
    }

    /// Whether the repository has truncated history.
    pub fn is_shallow(&self) -> bool {
        self.repo.is_shallow()
    }

    /// Summarize the checkout.
    pub fn snapshot(&self) -> Result<Snapshot, GitError> {
        Ok(Snapshot {
            commit: self.head_oid()?,
            branch: self.current_branch()?,
            shallow: self.is_shallow(),
        })
    }
}
