//! Request and result models exchanged with callers.
//!
//! - [`GenerationRequest`]: everything one generator invocation needs
//! - [`GenerationResult`]: what the invocation produced, exit code included
//! - [`CustomerRecord`]: one row of the customer listing

use crate::{CustomerName, SapVersion, SessionId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Parameters of a single generation, immutable once built.
///
/// # Examples
///
/// ```
/// use sapgen_core::{CustomerName, GenerationRequest, SapVersion};
///
/// let request = GenerationRequest::builder(CustomerName::new("acme").unwrap(), SapVersion::Ecc6)
///     .config_file("VBAK_structure.txt", "Table: VBAK")
///     .quote_field("customer_id")
///     .quote_field("quote_date")
///     .custom_field("ZZPRIORITY", "Priority level")
///     .special_logic("Apply 10% discount for VIP customers")
///     .build();
///
/// assert_eq!(request.config_files.len(), 1);
/// assert_eq!(request.quote_fields, vec!["customer_id", "quote_date"]);
/// assert!(!request.fork_session);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Customer whose output directory receives the generated code
    pub customer: CustomerName,
    /// Targeted SAP release
    pub sap_version: SapVersion,
    /// Config file name to file content, staged in name order
    pub config_files: BTreeMap<String, String>,
    /// Required quote fields, in the order given by the caller
    pub quote_fields: Vec<String>,
    /// Custom field name to description
    pub custom_fields: BTreeMap<String, String>,
    /// Free-text business logic description
    pub special_logic: Option<String>,
    /// Prior generator session to resume
    pub resume_session_id: Option<SessionId>,
    /// Branch the resumed session instead of continuing it
    pub fork_session: bool,
}

impl GenerationRequest {
    /// Starts building a request for a customer and SAP release.
    #[must_use]
    pub fn builder(customer: CustomerName, sap_version: SapVersion) -> GenerationRequestBuilder {
        GenerationRequestBuilder {
            request: Self {
                customer,
                sap_version,
                config_files: BTreeMap::new(),
                quote_fields: Vec::new(),
                custom_fields: BTreeMap::new(),
                special_logic: None,
                resume_session_id: None,
                fork_session: false,
            },
        }
    }
}

/// Builder for [`GenerationRequest`].
#[derive(Debug, Clone)]
pub struct GenerationRequestBuilder {
    request: GenerationRequest,
}

impl GenerationRequestBuilder {
    /// Adds a config file to stage for the generator.
    #[must_use]
    pub fn config_file(mut self, name: impl Into<String>, content: impl Into<String>) -> Self {
        self.request.config_files.insert(name.into(), content.into());
        self
    }

    /// Replaces all config files.
    #[must_use]
    pub fn config_files(mut self, files: BTreeMap<String, String>) -> Self {
        self.request.config_files = files;
        self
    }

    /// Appends a required quote field.
    #[must_use]
    pub fn quote_field(mut self, field: impl Into<String>) -> Self {
        self.request.quote_fields.push(field.into());
        self
    }

    /// Replaces all quote fields.
    #[must_use]
    pub fn quote_fields(mut self, fields: Vec<String>) -> Self {
        self.request.quote_fields = fields;
        self
    }

    /// Adds a custom field definition.
    #[must_use]
    pub fn custom_field(mut self, name: impl Into<String>, description: impl Into<String>) -> Self {
        self.request
            .custom_fields
            .insert(name.into(), description.into());
        self
    }

    /// Replaces all custom field definitions.
    #[must_use]
    pub fn custom_fields(mut self, fields: BTreeMap<String, String>) -> Self {
        self.request.custom_fields = fields;
        self
    }

    /// Sets the business logic description.
    #[must_use]
    pub fn special_logic(mut self, logic: impl Into<String>) -> Self {
        self.request.special_logic = Some(logic.into());
        self
    }

    /// Resumes a prior generator session.
    #[must_use]
    pub fn resume(mut self, session_id: SessionId, fork: bool) -> Self {
        self.request.resume_session_id = Some(session_id);
        self.request.fork_session = fork;
        self
    }

    /// Finishes the request.
    #[must_use]
    pub fn build(self) -> GenerationRequest {
        self.request
    }
}

/// Outcome of one generator invocation.
///
/// Always fully populated, whatever the generator's exit code. Callers decide
/// what a nonzero `exit_code` means.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult {
    /// Session identifier printed by the generator, if any
    pub session_id: Option<SessionId>,
    /// Customer output directory
    pub output_dir: String,
    /// Generated files, relative to the store root
    pub files: Vec<String>,
    /// Captured standard output
    pub stdout: String,
    /// Captured standard error
    pub stderr: String,
    /// Process exit code (`-1` when terminated by a signal)
    pub exit_code: i32,
}

impl GenerationResult {
    /// Returns `true` when the generator exited with code 0.
    #[must_use]
    pub const fn succeeded(&self) -> bool {
        self.exit_code == 0
    }
}

/// One customer directory in the output store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerRecord {
    /// Customer (directory) name
    pub name: String,
    /// Last modification time of the customer directory
    pub modified: DateTime<Utc>,
    /// Number of regular files below the customer directory
    pub file_count: usize,
}
