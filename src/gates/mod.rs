//! gates
//!
//! The feature gate document parser and its validator.
//!
//! # Modules
//!
//! - [`parser`] - Decodes the document and assembles the ordered gate list
//! - [`validate`] - Per-entry structural checks that build typed records
//!
//! # Error Policy
//!
//! Schema violations are fatal for the run and identify the offending entry:
//! gate violations carry the entry index (and name when known), spec
//! violations carry the gate name and spec index. Conditions that are
//! suspicious but not invalid are returned as [`ParseWarning`]s alongside
//! the result.

pub mod parser;
pub mod validate;

pub use parser::{parse_bytes, parse_file, parse_str};

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::core::gate::FeatureGate;
use crate::core::types::DocumentDigest;

/// Errors from parsing a gate document.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The document could not be read.
    #[error("failed to read gate document '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The bytes are not a single well-formed YAML document.
    #[error("failed to decode gate document: {message}")]
    Decode { message: String },

    /// The top level is not a list of gates.
    #[error("gate document must be a sequence of gates, found {found}")]
    NotASequence { found: &'static str },

    /// A top-level entry violates the gate schema.
    #[error("malformed gate at entry {index}{}: {reason}", gate_label(.name))]
    MalformedGate {
        index: usize,
        name: Option<String>,
        reason: String,
    },

    /// A versioned spec violates the spec schema.
    #[error("malformed spec {index} of gate '{gate}': {reason}")]
    MalformedSpec {
        gate: String,
        index: usize,
        reason: String,
    },

    /// Two entries share a name.
    #[error("duplicate gate '{name}' at entry {index} (first defined at entry {first_index})")]
    DuplicateGate {
        name: String,
        first_index: usize,
        index: usize,
    },
}

fn gate_label(name: &Option<String>) -> String {
    match name {
        Some(name) => format!(" ('{}')", name),
        None => String::new(),
    }
}

/// A condition worth reporting that does not invalidate the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParseWarning {
    /// A gate has no release history.
    EmptyVersionedSpecs { gate: String },

    /// A spec's version does not parse as `MAJOR.MINOR[.PATCH][-pre]`.
    UnrecognizedVersion {
        gate: String,
        index: usize,
        version: String,
        reason: String,
    },
}

impl std::fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseWarning::EmptyVersionedSpecs { gate } => {
                write!(f, "gate '{}' has no versioned specs", gate)
            }
            ParseWarning::UnrecognizedVersion {
                gate,
                index,
                version,
                ..
            } => write!(
                f,
                "spec {} of gate '{}' has unrecognized version '{}'; it will not sort chronologically",
                index, gate, version
            ),
        }
    }
}

/// The result of a successful parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDocument {
    /// Gates in document order
    pub gates: Vec<FeatureGate>,
    /// Non-fatal conditions, in the order encountered
    pub warnings: Vec<ParseWarning>,
    /// SHA-256 of the raw document
    pub digest: DocumentDigest,
}
