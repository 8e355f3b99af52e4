//! gates::parser
//!
//! Decoding of the versioned feature list into [`FeatureGate`] records.
//!
//! # Document Shape
//!
//! ```yaml
//! - name: Foo
//!   versionedSpecs:
//!     - {default: false, lockToDefault: false, preRelease: Alpha, version: "1.20"}
//!     - {default: true,  lockToDefault: true,  preRelease: GA,    version: "1.25"}
//! ```
//!
//! # Invariants
//!
//! - Gates come out in document order; specs within a gate too (no sorting)
//! - Gate names are unique
//! - The first structural violation aborts the parse; no partial list is returned
//!
//! # Example
//!
//! ```
//! use feature_gates::gates::parser::parse_str;
//!
//! let doc = parse_str(r#"
//! - name: Foo
//!   versionedSpecs:
//!     - {default: false, lockToDefault: false, preRelease: Alpha, version: "1.20"}
//!     - {default: true, lockToDefault: true, preRelease: GA, version: "1.25"}
//! "#).unwrap();
//!
//! assert_eq!(doc.gates.len(), 1);
//! let foo = &doc.gates[0];
//! assert_eq!(foo.name(), "Foo");
//! assert!(foo.versioned_specs()[1].effective_value(Some(false)));
//! ```

use std::collections::HashMap;
use std::path::Path;

use serde_yaml::Value;

use super::validate::{kind, validate_gate};
use super::{ParseError, ParsedDocument};
use crate::core::types::DocumentDigest;

/// Read and parse the gate document at `path`.
///
/// # Errors
///
/// Returns [`ParseError::Read`] if the file cannot be read, otherwise any
/// error from [`parse_bytes`].
pub fn parse_file(path: &Path) -> Result<ParsedDocument, ParseError> {
    let bytes = std::fs::read(path).map_err(|source| ParseError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_bytes(&bytes)
}

/// Parse a gate document held in memory.
pub fn parse_str(document: &str) -> Result<ParsedDocument, ParseError> {
    parse_bytes(document.as_bytes())
}

/// Parse raw document bytes.
///
/// # Errors
///
/// - [`ParseError::Decode`] if the bytes are not a single YAML document
/// - [`ParseError::NotASequence`] if the top level is not a list
/// - [`ParseError::MalformedGate`] / [`ParseError::MalformedSpec`] for schema violations
/// - [`ParseError::DuplicateGate`] if a name appears twice
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

pub fn parse_bytes(bytes: &[u8]) -> Result<ParsedDocument, ParseError> {
    let digest = DocumentDigest::compute(bytes);
    let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let root: Value = serde_yaml::from_slice(body).map_err(|e| ParseError::Decode {
        message: e.to_string(),
    })?;

    let entries = match &root {
        // An empty document decodes to null.
        Value::Null => &[][..],
        Value::Sequence(entries) => entries.as_slice(),
        other => return Err(ParseError::NotASequence { found: kind(other) }),
    };

    let mut warnings = Vec::new();
    let mut seen: HashMap<String, usize> = HashMap::with_capacity(entries.len());
    let mut gates = Vec::with_capacity(entries.len());

    for (index, entry) in entries.iter().enumerate() {
        let gate = validate_gate(index, entry, &mut warnings)?;
        if let Some(&first_index) = seen.get(gate.name()) {
            return Err(ParseError::DuplicateGate {
                name: gate.name().to_string(),
                first_index,
                index,
            });
        }
        seen.insert(gate.name().to_string(), index);
        gates.push(gate);
    }

    Ok(ParsedDocument {
        gates,
        warnings,
        digest,
    })
}
