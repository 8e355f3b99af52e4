//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`BranchName`] - Validated Git branch name (the upstream branch to fetch)
//! - [`Oid`] - Git object identifier of the fetched snapshot
//! - [`PreRelease`] - Closed set of gate maturity stages
//! - [`ReleaseVersion`] - Parsed `MAJOR.MINOR[.PATCH][-pre]` release identifier
//! - [`UtcTimestamp`] - RFC3339 timestamp
//! - [`DocumentDigest`] - SHA-256 of the raw gate document
//!
//! # Validation
//!
//! These types enforce validity at construction time. Invalid values
//! cannot be represented.
//!
//! # Examples
//!
//! ```
//! use feature_gates::core::types::{BranchName, PreRelease, ReleaseVersion};
//!
//! let branch = BranchName::new("master").unwrap();
//! assert_eq!(branch.as_str(), "master");
//!
//! let stage: PreRelease = "GA".parse().unwrap();
//! assert_eq!(stage, PreRelease::GenerallyAvailable);
//! assert!("Stable".parse::<PreRelease>().is_err());
//!
//! let alpha = ReleaseVersion::parse("1.31-alpha.1").unwrap();
//! let release = ReleaseVersion::parse("1.31").unwrap();
//! assert!(alpha < release);
//! ```

use std::cmp::Ordering;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid branch name: {0}")]
    InvalidBranchName(String),

    #[error("invalid object id: {0}")]
    InvalidOid(String),

    #[error("invalid gate name: {0}")]
    InvalidGateName(String),

    #[error("invalid pre-release stage '{0}', must be one of: Alpha, Beta, GA, Deprecated")]
    InvalidPreRelease(String),

    #[error("invalid release version: {0}")]
    InvalidVersion(String),
}

/// A validated Git branch name.
///
/// Branch names follow the rules of `git check-ref-format --branch`:
/// non-empty, no leading `.` or `-`, no trailing `/` or `.lock`, no `..`,
/// `@{` or `//`, and none of the characters ` ~^:\?*[` or control characters.
///
/// # Example
///
/// ```
/// use feature_gates::core::types::BranchName;
///
/// assert!(BranchName::new("release-1.31").is_ok());
/// assert!(BranchName::new("").is_err());
/// assert!(BranchName::new("-upload-pack").is_err());
/// assert!(BranchName::new("has space").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BranchName(String);

impl BranchName {
    /// Create a new validated branch name.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidBranchName` if the name violates Git's refname rules.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        Self::validate(&name)?;
        Ok(Self(name))
    }

    fn validate(name: &str) -> Result<(), TypeError> {
        let reject = |reason: &str| Err(TypeError::InvalidBranchName(reason.to_string()));

        if name.is_empty() {
            return reject("branch name cannot be empty");
        }
        if name == "@" {
            return reject("branch name cannot be '@' (reserved)");
        }
        // A leading '-' would be read as an option by the git CLI.
        if name.starts_with('-') {
            return reject("branch name cannot start with '-'");
        }
        if name.ends_with('/') {
            return reject("branch name cannot end with '/'");
        }
        for forbidden in ["..", "@{", "//"] {
            if name.contains(forbidden) {
                return Err(TypeError::InvalidBranchName(format!(
                    "branch name cannot contain '{forbidden}'"
                )));
            }
        }

        const INVALID_CHARS: [char; 8] = [' ', '~', '^', ':', '\\', '?', '*', '['];
        if let Some(c) = name.chars().find(|c| INVALID_CHARS.contains(c)) {
            return Err(TypeError::InvalidBranchName(format!(
                "branch name cannot contain '{c}'"
            )));
        }
        if name.chars().any(|c| c.is_ascii_control()) {
            return reject("branch name cannot contain control characters");
        }

        for component in name.split('/') {
            if component.starts_with('.') {
                return reject("path component cannot start with '.'");
            }
            if component.ends_with(".lock") {
                return reject("path component cannot end with '.lock'");
            }
        }

        Ok(())
    }

    /// Get the branch name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for BranchName {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<BranchName> for String {
    fn from(name: BranchName) -> Self {
        name.0
    }
}

impl AsRef<str> for BranchName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BranchName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A Git object identifier (SHA-1 or SHA-256), normalized to lowercase.
///
/// Identifies the upstream commit a run was parsed from.
///
/// # Example
///
/// ```
/// use feature_gates::core::types::Oid;
///
/// let oid = Oid::new("ABC123DEF4567890ABC123DEF4567890ABC12345").unwrap();
/// assert_eq!(oid.as_str(), "abc123def4567890abc123def4567890abc12345");
/// assert_eq!(oid.short(7), "abc123d");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Oid(String);

impl Oid {
    /// Create a new validated object id.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidOid` if the string is not a 40 or 64 character hex OID.
    pub fn new(oid: impl Into<String>) -> Result<Self, TypeError> {
        let oid = oid.into().to_ascii_lowercase();
        if oid.len() != 40 && oid.len() != 64 {
            return Err(TypeError::InvalidOid(format!(
                "expected 40 or 64 hex characters, got {}",
                oid.len()
            )));
        }
        if !oid.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(TypeError::InvalidOid(
                "object id must be hexadecimal".into(),
            ));
        }
        Ok(Self(oid))
    }

    /// Get an abbreviated form of the OID.
    pub fn short(&self, len: usize) -> &str {
        let end = len.min(self.0.len());
        &self.0[..end]
    }

    /// Get the object id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Oid {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<Oid> for String {
    fn from(oid: Oid) -> Self {
        oid.0
    }
}

impl std::fmt::Display for Oid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Maturity stage of a feature gate at one release.
///
/// The source document spells these `Alpha`, `Beta`, `GA` and `Deprecated`.
/// Any other spelling is rejected. Variants are ordered by lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PreRelease {
    Alpha,
    Beta,
    #[serde(rename = "GA")]
    GenerallyAvailable,
    Deprecated,
}

impl PreRelease {
    /// All stages, in lifecycle order.
    pub const ALL: [PreRelease; 4] = [
        PreRelease::Alpha,
        PreRelease::Beta,
        PreRelease::GenerallyAvailable,
        PreRelease::Deprecated,
    ];

    /// The spelling used in the source document.
    pub fn as_str(&self) -> &'static str {
        match self {
            PreRelease::Alpha => "Alpha",
            PreRelease::Beta => "Beta",
            PreRelease::GenerallyAvailable => "GA",
            PreRelease::Deprecated => "Deprecated",
        }
    }
}

impl FromStr for PreRelease {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PreRelease::ALL
            .into_iter()
            .find(|stage| stage.as_str() == s)
            .ok_or_else(|| TypeError::InvalidPreRelease(s.to_string()))
    }
}

impl std::fmt::Display for PreRelease {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A release identifier such as `1.20`, `1.20.3` or `1.31-alpha.1`.
///
/// Two-component versions are read as `MAJOR.MINOR.0`. A leading `v` is
/// accepted. Ordering follows semantic versioning, so a pre-release sorts
/// before its release. The original spelling is preserved for display.
///
/// # Example
///
/// ```
/// use feature_gates::core::types::ReleaseVersion;
///
/// let v = ReleaseVersion::parse("v1.9").unwrap();
/// assert!(v < ReleaseVersion::parse("1.10").unwrap());
/// assert_eq!(v.as_str(), "v1.9");
/// assert!(ReleaseVersion::parse("next").is_err());
/// ```
#[derive(Debug, Clone)]
pub struct ReleaseVersion {
    raw: String,
    semver: semver::Version,
}

impl ReleaseVersion {
    /// Parse a release identifier.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidVersion` unless the string has two or three
    /// numeric components, optionally followed by a `-pre` suffix.
    pub fn parse(raw: &str) -> Result<Self, TypeError> {
        let trimmed = raw.trim();
        let body = trimmed.strip_prefix('v').unwrap_or(trimmed);
        let (core, pre) = match body.split_once('-') {
            Some((core, pre)) => (core, Some(pre)),
            None => (body, None),
        };

        let mut normalized = match core.split('.').count() {
            2 => format!("{core}.0"),
            3 => core.to_string(),
            _ => {
                return Err(TypeError::InvalidVersion(format!(
                    "'{raw}' is not MAJOR.MINOR[.PATCH]"
                )))
            }
        };
        if let Some(pre) = pre {
            normalized.push('-');
            normalized.push_str(pre);
        }

        let semver = semver::Version::parse(&normalized)
            .map_err(|e| TypeError::InvalidVersion(format!("'{raw}': {e}")))?;

        Ok(Self {
            raw: raw.to_string(),
            semver,
        })
    }

    /// The version as written in the document.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The normalized semantic version.
    pub fn semver(&self) -> &semver::Version {
        &self.semver
    }

    /// Whether this identifies a pre-release build.
    pub fn is_pre_release(&self) -> bool {
        !self.semver.pre.is_empty()
    }
}

impl PartialEq for ReleaseVersion {
    fn eq(&self, other: &Self) -> bool {
        self.semver == other.semver
    }
}

impl Eq for ReleaseVersion {}

impl PartialOrd for ReleaseVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ReleaseVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.semver.cmp(&other.semver)
    }
}

impl FromStr for ReleaseVersion {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Display for ReleaseVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

/// A UTC timestamp in RFC3339 format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtcTimestamp(chrono::DateTime<chrono::Utc>);

impl UtcTimestamp {
    /// Create a timestamp for the current moment.
    pub fn now() -> Self {
        Self(chrono::Utc::now())
    }
}

impl std::fmt::Display for UtcTimestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

/// SHA-256 over the raw bytes of a gate document.
///
/// Two runs that fetched the same upstream commit produce the same digest.
///
/// # Example
///
/// ```
/// use feature_gates::core::types::DocumentDigest;
///
/// let a = DocumentDigest::compute(b"- name: Foo\n");
/// let b = DocumentDigest::compute(b"- name: Foo\n");
/// assert_eq!(a, b);
/// assert_eq!(a.as_str().len(), 64);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentDigest(String);

impl DocumentDigest {
    /// Hash a document's bytes.
    pub fn compute(bytes: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        Self(hex::encode(hasher.finalize()))
    }

    /// Get the digest as a hex string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DocumentDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
