//! core
//!
//! Core domain types, configuration, and workspace management.
//!
//! # Modules
//!
//! - [`types`] - Strong types: BranchName, Oid, PreRelease, ReleaseVersion, etc.
//! - [`gate`] - FeatureGate and VersionedSpec records
//! - [`config`] - Configuration schema and loading
//! - [`paths`] - Centralized path routing inside a workspace
//! - [`workspace`] - Scoped, automatically reclaimed temporary directory
//!
//! # Design Principles
//!
//! - Strong typing prevents invalid states at construction time
//! - Schemas are strict (unknown config keys are rejected)
//! - Nothing here performs network I/O

pub mod config;
pub mod gate;
pub mod paths;
pub mod types;
pub mod workspace;
