//! core::gate
//!
//! The feature gate model.
//!
//! A [`FeatureGate`] names one capability and carries its release history as
//! an ordered list of [`VersionedSpec`] records. Records are built by the
//! document parser and are immutable afterwards: fields are only reachable
//! through accessors.
//!
//! # Ordering
//!
//! `versioned_specs()` preserves document order, which is not necessarily
//! chronological. Use [`FeatureGate::chronological_specs`] when release
//! order matters.
//!
//! # Lock Invariant
//!
//! When `lock_to_default` is set, the effective value at that version is
//! exactly `default`. [`VersionedSpec::effective_value`] and
//! [`VersionedSpec::check_override`] are the only ways this crate resolves a
//! gate's value, and both honor the lock.

use serde::Serialize;
use thiserror::Error;

use super::types::{PreRelease, ReleaseVersion, TypeError};

/// Errors from resolving a gate value.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GateError {
    /// An operator tried to override a value that is locked to its default.
    #[error("feature gate value is locked to {default} at version {version}")]
    Locked { version: String, default: bool },
}

/// The state of a feature gate as of one release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionedSpec {
    version: String,
    pre_release: PreRelease,
    default: bool,
    lock_to_default: bool,
}

impl VersionedSpec {
    /// Build a spec record.
    pub fn new(
        version: impl Into<String>,
        pre_release: PreRelease,
        default: bool,
        lock_to_default: bool,
    ) -> Self {
        Self {
            version: version.into(),
            pre_release,
            default,
            lock_to_default,
        }
    }

    /// The release identifier as written in the document.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// The parsed release identifier, if it is well formed.
    pub fn release_version(&self) -> Option<ReleaseVersion> {
        ReleaseVersion::parse(&self.version).ok()
    }

    pub fn pre_release(&self) -> PreRelease {
        self.pre_release
    }

    /// Whether the gate is enabled by default at this version.
    pub fn default(&self) -> bool {
        self.default
    }

    /// Whether the value is frozen to `default` at this version.
    pub fn lock_to_default(&self) -> bool {
        self.lock_to_default
    }

    /// Resolve the gate's value given an optional operator setting.
    ///
    /// A locked spec ignores the requested value.
    ///
    /// # Example
    ///
    /// ```
    /// use feature_gates::core::gate::VersionedSpec;
    /// use feature_gates::core::types::PreRelease;
    ///
    /// let locked = VersionedSpec::new("1.25", PreRelease::GenerallyAvailable, true, true);
    /// assert!(locked.effective_value(Some(false)));
    ///
    /// let open = VersionedSpec::new("1.20", PreRelease::Alpha, false, false);
    /// assert!(open.effective_value(Some(true)));
    /// assert!(!open.effective_value(None));
    /// ```
    pub fn effective_value(&self, requested: Option<bool>) -> bool {
        if self.lock_to_default {
            self.default
        } else {
            requested.unwrap_or(self.default)
        }
    }

    /// Validate an operator override against this spec.
    ///
    /// # Errors
    ///
    /// Returns `GateError::Locked` if the spec is locked and `value` differs
    /// from the default. Setting a locked gate to its default is accepted.
    pub fn check_override(&self, value: bool) -> Result<bool, GateError> {
        if self.lock_to_default && value != self.default {
            return Err(GateError::Locked {
                version: self.version.clone(),
                default: self.default,
            });
        }
        Ok(value)
    }
}

/// One named capability and its release history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureGate {
    name: String,
    versioned_specs: Vec<VersionedSpec>,
}

impl FeatureGate {
    /// Build a gate record.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidGateName` if `name` is empty or only whitespace.
    pub fn new(
        name: impl Into<String>,
        versioned_specs: Vec<VersionedSpec>,
    ) -> Result<Self, TypeError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(TypeError::InvalidGateName(
                "gate name cannot be empty".into(),
            ));
        }
        Ok(Self {
            name,
            versioned_specs,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Specs in document order.
    pub fn versioned_specs(&self) -> &[VersionedSpec] {
        &self.versioned_specs
    }

    /// Specs in release order.
    ///
    /// The sort is stable: specs with equal versions keep document order,
    /// and specs whose version cannot be parsed follow all parsed ones in
    /// document order.
    pub fn chronological_specs(&self) -> Vec<&VersionedSpec> {
        let mut keyed: Vec<(Option<ReleaseVersion>, &VersionedSpec)> = self
            .versioned_specs
            .iter()
            .map(|spec| (spec.release_version(), spec))
            .collect();

        keyed.sort_by(|(a, _), (b, _)| match (a, b) {
            (Some(a), Some(b)) => a.cmp(b),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });

        keyed.into_iter().map(|(_, spec)| spec).collect()
    }

    /// The spec in force at `version`: the latest spec released at or
    /// before it. Ties resolve to the spec that appears last in the document.
    ///
    /// # Example
    ///
    /// ```
    /// use feature_gates::core::gate::{FeatureGate, VersionedSpec};
    /// use feature_gates::core::types::{PreRelease, ReleaseVersion};
    ///
    /// let gate = FeatureGate::new("Foo", vec![
    ///     VersionedSpec::new("1.20", PreRelease::Alpha, false, false),
    ///     VersionedSpec::new("1.25", PreRelease::GenerallyAvailable, true, true),
    /// ]).unwrap();
    ///
    /// let at = |v: &str| gate.spec_at(&ReleaseVersion::parse(v).unwrap());
    /// assert!(at("1.19").is_none());
    /// assert_eq!(at("1.22").unwrap().version(), "1.20");
    /// assert_eq!(at("1.30").unwrap().version(), "1.25");
    /// ```
    pub fn spec_at(&self, version: &ReleaseVersion) -> Option<&VersionedSpec> {
        self.chronological_specs()
            .into_iter()
            .filter(|spec| matches!(spec.release_version(), Some(v) if &v <= version))
            .next_back()
    }

    /// The most recent spec by release order, if any version parses.
    pub fn latest(&self) -> Option<&VersionedSpec> {
        self.chronological_specs()
            .into_iter()
            .filter(|spec| spec.release_version().is_some())
            .next_back()
    }
}
