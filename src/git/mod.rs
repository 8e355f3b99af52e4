//! git
//!
//! Retrieval and inspection of the upstream repository snapshot.
//!
//! # Architecture
//!
//! - [`fetch`] - The [`SourceFetcher`] seam and its git CLI implementation
//! - `interface` - Read-only git2 inspection of a checkout ([`Git`])
//!
//! The clone itself shells out to the git CLI, which handles transports,
//! shallow negotiation and single-branch refspecs. Everything read back from
//! the checkout goes through [`Git`]. No other module imports `git2`.
//!
//! # Invariants
//!
//! - A fetch writes only inside the workspace it was given
//! - The parent process's current directory is never changed
//! - A fetch is attempted exactly once per run

pub mod fetch;
mod interface;

pub use fetch::{FetchError, FetchedSource, GitCliFetcher, SourceFetcher};
pub use interface::{Git, GitError, Snapshot};
