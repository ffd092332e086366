//! Error types for the SAP endpoint generator.
//!
//! This module provides a single error hierarchy with contextual information,
//! shared by every crate in the workspace. A nonzero exit code of the external
//! generator is *not* an error: it is reported as data in
//! [`GenerationResult`](crate::GenerationResult).
//!
//! # Examples
//!
//! ```
//! use sapgen_core::{Error, Result};
//!
//! fn find_customer(name: &str) -> Result<()> {
//!     Err(Error::CustomerNotFound {
//!         customer: name.to_string(),
//!     })
//! }
//!
//! let err = find_customer("acme").unwrap_err();
//! assert!(err.is_not_found());
//! ```

use thiserror::Error;

/// Main error type for the SAP endpoint generator.
#[derive(Error, Debug)]
pub enum Error {
    /// No generated output exists for the customer.
    ///
    /// Raised when an archive is requested for a customer whose output
    /// directory does not exist in the output store.
    #[error("No generated code found for {customer}")]
    CustomerNotFound {
        /// Name of the customer that was looked up
        customer: String,
    },

    /// Validation error for domain types and request payloads.
    #[error("Validation error in {field}: {reason}")]
    ValidationError {
        /// The field that failed validation
        field: String,
        /// Detailed reason for the validation failure
        reason: String,
    },

    /// Configuration error.
    ///
    /// Raised when configuration is invalid or the environment is missing
    /// something the service needs, such as the provider API key.
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the configuration problem
        message: String,
    },

    /// Timeout error.
    ///
    /// Occurs when the generator exceeds its configured wall-clock limit.
    #[error("Operation timed out after {duration_secs}s: {operation}")]
    Timeout {
        /// Name of the operation that timed out
        operation: String,
        /// Duration in seconds before timeout occurred
        duration_secs: u64,
    },

    /// The generator process could not be started.
    #[error("Failed to spawn generator '{program}'")]
    SpawnFailed {
        /// Program that was being spawned
        program: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Filesystem error with context.
    #[error("I/O error while {context}")]
    Io {
        /// What the service was doing when the error occurred
        context: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Archive construction failed.
    #[error("Archive error: {message}")]
    ArchiveError {
        /// Description of the archive failure
        message: String,
        /// Optional underlying error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Unexpected internal failure, such as a panicked background task.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the failure
        message: String,
    },

    /// Serialization/deserialization error.
    #[error("Serialization error: {message}")]
    SerializationError {
        /// Description of the serialization failure
        message: String,
        /// Underlying serde error
        #[source]
        source: Option<serde_json::Error>,
    },
}

impl Error {
    /// Creates an [`Error::Io`] with a description of the failed operation.
    ///
    /// # Examples
    ///
    /// ```
    /// use sapgen_core::Error;
    ///
    /// let err = Error::io(
    ///     "reading store root",
    ///     std::io::Error::from(std::io::ErrorKind::PermissionDenied),
    /// );
    /// assert!(err.is_io_error());
    /// assert_eq!(err.to_string(), "I/O error while reading store root");
    /// ```
    #[must_use]
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Returns `true` if this is a customer-not-found error.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::CustomerNotFound { .. })
    }

    /// Returns `true` if this is a validation error.
    ///
    /// # Examples
    ///
    /// ```
    /// use sapgen_core::Error;
    ///
    /// let err = Error::ValidationError {
    ///     field: "customer_name".to_string(),
    ///     reason: "must not be empty".to_string(),
    /// };
    /// assert!(err.is_validation_error());
    /// ```
    #[must_use]
    pub const fn is_validation_error(&self) -> bool {
        matches!(self, Self::ValidationError { .. })
    }

    /// Returns `true` if this is a configuration error.
    #[must_use]
    pub const fn is_config_error(&self) -> bool {
        matches!(self, Self::ConfigError { .. })
    }

    /// Returns `true` if this is a timeout error.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Returns `true` if the generator could not be spawned.
    #[must_use]
    pub const fn is_spawn_error(&self) -> bool {
        matches!(self, Self::SpawnFailed { .. })
    }

    /// Returns `true` if this is a filesystem error.
    #[must_use]
    pub const fn is_io_error(&self) -> bool {
        matches!(self, Self::Io { .. })
    }
}

/// Result type alias for generator service operations.
pub type Result<T> = std::result::Result<T, Error>;
