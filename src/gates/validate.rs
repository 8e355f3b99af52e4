//! gates::validate
//!
//! Structural validation of decoded gate entries.
//!
//! Each function takes one decoded YAML node and either builds the typed
//! record or reports exactly which entry and field is at fault. Records are
//! only ever constructed from nodes that passed every check.

use serde_yaml::{Mapping, Value};

use super::{ParseError, ParseWarning};
use crate::core::gate::{FeatureGate, VersionedSpec};
use crate::core::types::{PreRelease, ReleaseVersion};

/// Document key holding the gate name.
pub const KEY_NAME: &str = "name";
/// Document key holding the release history.
pub const KEY_VERSIONED_SPECS: &str = "versionedSpecs";
pub const KEY_DEFAULT: &str = "default";
pub const KEY_LOCK_TO_DEFAULT: &str = "lockToDefault";
pub const KEY_PRE_RELEASE: &str = "preRelease";
pub const KEY_VERSION: &str = "version";

/// Human name of a YAML node kind, for error messages.
pub(crate) fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}

/// Validate the top-level entry at `index` and build its gate.
///
/// Warnings for conditions that do not invalidate the entry are appended to
/// `warnings`.
pub fn validate_gate(
    index: usize,
    entry: &Value,
    warnings: &mut Vec<ParseWarning>,
) -> Result<FeatureGate, ParseError> {
    let malformed = |name: Option<&str>, reason: String| ParseError::MalformedGate {
        index,
        name: name.map(str::to_string),
        reason,
    };

    let map = entry
        .as_mapping()
        .ok_or_else(|| malformed(None, format!("expected a mapping, found {}", kind(entry))))?;

    let name = match map.get(KEY_NAME) {
        None => return Err(malformed(None, format!("missing field `{}`", KEY_NAME))),
        Some(Value::String(name)) if name.trim().is_empty() => {
            return Err(malformed(None, format!("field `{}` is empty", KEY_NAME)))
        }
        Some(Value::String(name)) => name.as_str(),
        Some(other) => {
            return Err(malformed(
                None,
                format!("field `{}` must be a string, found {}", KEY_NAME, kind(other)),
            ))
        }
    };

    let specs = match map.get(KEY_VERSIONED_SPECS) {
        None => {
            return Err(malformed(
                Some(name),
                format!("missing field `{}`", KEY_VERSIONED_SPECS),
            ))
        }
        Some(Value::Sequence(specs)) => specs,
        Some(other) => {
            return Err(malformed(
                Some(name),
                format!(
                    "field `{}` must be a sequence, found {}",
                    KEY_VERSIONED_SPECS,
                    kind(other)
                ),
            ))
        }
    };

    if specs.is_empty() {
        warnings.push(ParseWarning::EmptyVersionedSpecs {
            gate: name.to_string(),
        });
    }

    let versioned_specs = specs
        .iter()
        .enumerate()
        .map(|(spec_index, spec)| validate_spec(name, spec_index, spec, warnings))
        .collect::<Result<Vec<_>, _>>()?;

    FeatureGate::new(name, versioned_specs).map_err(|e| malformed(Some(name), e.to_string()))
}

/// Validate spec `index` of gate `gate` and build the record.
pub fn validate_spec(
    gate: &str,
    index: usize,
    entry: &Value,
    warnings: &mut Vec<ParseWarning>,
) -> Result<VersionedSpec, ParseError> {
    let malformed = |reason: String| ParseError::MalformedSpec {
        gate: gate.to_string(),
        index,
        reason,
    };

    let map = entry
        .as_mapping()
        .ok_or_else(|| malformed(format!("expected a mapping, found {}", kind(entry))))?;

    let default = required_bool(map, KEY_DEFAULT).map_err(malformed)?;
    let lock_to_default = required_bool(map, KEY_LOCK_TO_DEFAULT).map_err(malformed)?;
    let pre_release: PreRelease = required_str(map, KEY_PRE_RELEASE)
        .map_err(malformed)?
        .parse()
        .map_err(|e| malformed(format!("field `{}`: {}", KEY_PRE_RELEASE, e)))?;
    let version = required_str(map, KEY_VERSION).map_err(malformed)?;

    if let Err(e) = ReleaseVersion::parse(version) {
        warnings.push(ParseWarning::UnrecognizedVersion {
            gate: gate.to_string(),
            index,
            version: version.to_string(),
            reason: e.to_string(),
        });
    }

    Ok(VersionedSpec::new(
        version,
        pre_release,
        default,
        lock_to_default,
    ))
}

fn required<'a>(map: &'a Mapping, key: &str) -> Result<&'a Value, String> {
    map.get(key)
        .ok_or_else(|| format!("missing field `{}`", key))
}

fn required_bool(map: &Mapping, key: &str) -> Result<bool, String> {
    let value = required(map, key)?;
    value
        .as_bool()
        .ok_or_else(|| format!("field `{}` must be a boolean, found {}", key, kind(value)))
}

fn required_str<'a>(map: &'a Mapping, key: &str) -> Result<&'a str, String> {
    let value = required(map, key)?;
    value
        .as_str()
        .ok_or_else(|| format!("field `{}` must be a string, found {}", key, kind(value)))
}
