//! feature-gates - fetch and parse a repository's versioned feature gate list
//!
//! The tool performs a single run: it allocates a scoped workspace, takes a
//! shallow single-branch snapshot of the upstream repository, decodes the
//! versioned feature list into typed records, and releases the workspace on
//! every exit path.
//!
//! # Architecture
//!
//! The codebase follows a layered architecture:
//!
//! - [`cli`] - Command-line interface layer (parses args, merges config, runs once)
//! - [`engine`] - Preconditions and the run pipeline state machine
//! - [`gates`] - Feature gate document parser and validator
//! - [`core`] - Domain types, configuration, workspace and path routing
//! - [`git`] - Snapshot retrieval and inspection
//! - [`ui`] - Console output
//!
//! # Correctness Invariants
//!
//! 1. A workspace that was acquired is removed on every exit path
//! 2. Either the full ordered gate list is produced, or none is
//! 3. A spec locked to its default never yields any other effective value

pub mod cli;
pub mod core;
pub mod engine;
pub mod gates;
pub mod git;
pub mod ui;
