//! Strong domain types for the SAP endpoint generator.
//!
//! This module implements the newtype pattern so customer names, SAP versions,
//! and session identifiers are never mixed up with other strings.
//!
//! # Examples
//!
//! ```
//! use sapgen_core::{CustomerName, SapVersion};
//!
//! let customer = CustomerName::new("acme").unwrap();
//! let version: SapVersion = "ECC6".parse().unwrap();
//! assert_eq!(customer.as_str(), "acme");
//! assert!(version.is_known());
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Customer identifier (newtype over String).
///
/// A customer name maps to exactly one directory under the output store root,
/// so it must be a single, non-empty path component.
///
/// # Examples
///
/// ```
/// use sapgen_core::CustomerName;
///
/// assert!(CustomerName::new("acme").is_ok());
/// assert!(CustomerName::new("").is_err());
/// assert!(CustomerName::new("../etc").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CustomerName(String);

impl CustomerName {
    /// Creates a validated customer name.
    ///
    /// # Errors
    ///
    /// Returns `Error::ValidationError` if the name is empty, is `.` or `..`,
    /// or contains a path separator or NUL byte.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(invalid_customer("must not be empty"));
        }
        if name == "." || name == ".." {
            return Err(invalid_customer("must not be a relative path component"));
        }
        if name.contains(['/', '\\', '\0']) {
            return Err(invalid_customer(
                "must be a single path component without separators",
            ));
        }
        Ok(Self(name))
    }

    /// Returns the customer name as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `CustomerName` and returns the inner `String`.
    #[inline]
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

fn invalid_customer(reason: &str) -> Error {
    Error::ValidationError {
        field: "customer_name".to_string(),
        reason: reason.to_string(),
    }
}

impl fmt::Display for CustomerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for CustomerName {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<&str> for CustomerName {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl From<CustomerName> for String {
    fn from(name: CustomerName) -> Self {
        name.0
    }
}

impl AsRef<std::path::Path> for CustomerName {
    fn as_ref(&self) -> &std::path::Path {
        std::path::Path::new(&self.0)
    }
}

/// SAP release targeted by a generation.
///
/// The generator CLI owns validation of this value, so unrecognized strings
/// are kept verbatim in [`SapVersion::Other`] and passed through.
///
/// # Examples
///
/// ```
/// use sapgen_core::SapVersion;
///
/// let v: SapVersion = "S4HANA".parse().unwrap();
/// assert_eq!(v, SapVersion::S4Hana);
///
/// let other: SapVersion = "ECC5".parse().unwrap();
/// assert!(!other.is_known());
/// assert_eq!(other.as_str(), "ECC5");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SapVersion {
    /// SAP R/3
    R3,
    /// SAP ECC 6.0
    Ecc6,
    /// SAP S/4HANA
    S4Hana,
    /// Any other value, forwarded unchanged
    Other(String),
}

impl SapVersion {
    /// Returns the string passed to the generator CLI.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::R3 => "R3",
            Self::Ecc6 => "ECC6",
            Self::S4Hana => "S4HANA",
            Self::Other(raw) => raw,
        }
    }

    /// Returns `true` for the releases the generator documents.
    #[must_use]
    pub const fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl FromStr for SapVersion {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s {
            "R3" => Self::R3,
            "ECC6" => Self::Ecc6,
            "S4HANA" => Self::S4Hana,
            other => Self::Other(other.to_string()),
        })
    }
}

impl From<String> for SapVersion {
    fn from(s: String) -> Self {
        match s.as_str() {
            "R3" => Self::R3,
            "ECC6" => Self::Ecc6,
            "S4HANA" => Self::S4Hana,
            _ => Self::Other(s),
        }
    }
}

impl From<SapVersion> for String {
    fn from(v: SapVersion) -> Self {
        match v {
            SapVersion::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for SapVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque session identifier emitted by the generator CLI.
///
/// Passing it back as `resume_session_id` lets the generator continue its
/// internal state; this service never interprets it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Creates a new session identifier.
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the session ID as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
