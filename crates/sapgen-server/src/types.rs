//! Request and response payloads shared by the HTTP and MCP facades.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use sapgen_core::{CustomerName, GenerationRequest, Result, SapVersion, SessionId};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// generate
// ============================================================================

/// Parameters for generating a quote endpoint.
///
/// Same shape for `POST /api/generate` and the `generate_endpoint` tool.
///
/// # Examples
///
/// ```
/// use sapgen_server::types::GenerateParams;
///
/// let params: GenerateParams = serde_json::from_str(r#"{
///     "customer_name": "acme",
///     "sap_version": "ECC6",
///     "config_files": {"VBAK_structure.txt": "Table: VBAK"},
///     "quote_fields": ["customer_id", "quote_date"]
/// }"#).unwrap();
///
/// let request = params.into_request().unwrap();
/// assert_eq!(request.customer.as_str(), "acme");
/// assert!(!request.fork_session);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GenerateParams {
    /// Customer identifier, used as the output directory name
    pub customer_name: String,

    /// SAP release: R3, ECC6 or S4HANA
    pub sap_version: String,

    /// Config file name to file content
    pub config_files: BTreeMap<String, String>,

    /// Field names the quote endpoint must expose
    pub quote_fields: Vec<String>,

    /// Custom SAP field name to description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_fields: Option<BTreeMap<String, String>>,

    /// Free-form business rules for the generator
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_logic: Option<String>,

    /// Session to continue, from a previous generation result
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_session_id: Option<String>,

    /// Branch from the resumed session instead of continuing it
    #[serde(default)]
    pub fork_session: bool,
}

impl GenerateParams {
    /// Converts the payload into a validated generation request.
    ///
    /// # Errors
    ///
    /// Returns `Error::ValidationError` if the customer name is not a valid
    /// directory name.
    pub fn into_request(self) -> Result<GenerationRequest> {
        let customer = CustomerName::new(self.customer_name)?;
        let sap_version = SapVersion::from(self.sap_version);

        let mut builder = GenerationRequest::builder(customer, sap_version)
            .config_files(self.config_files)
            .quote_fields(self.quote_fields)
            .custom_fields(self.custom_fields.unwrap_or_default());

        if let Some(logic) = self.special_logic {
            builder = builder.special_logic(logic);
        }
        if let Some(session) = self.resume_session_id.filter(|s| !s.is_empty()) {
            builder = builder.resume(SessionId::new(session), self.fork_session);
        }

        Ok(builder.build())
    }
}

// ============================================================================
// download
// ============================================================================

/// Parameters for downloading a customer's generated code.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct DownloadParams {
    /// Customer whose output should be archived
    pub customer_name: String,
}

/// Zip archive of a customer's generated code, encoded for JSON transport.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DownloadResult {
    /// Customer the archive belongs to
    pub customer: String,

    /// Size of the decoded archive in bytes
    pub size_bytes: usize,

    /// Standard base64 encoding of the zip archive
    pub archive_base64: String,
}

impl DownloadResult {
    /// Encodes archive bytes for a customer.
    #[must_use]
    pub fn encode(customer: &CustomerName, archive: &[u8]) -> Self {
        Self {
            customer: customer.to_string(),
            size_bytes: archive.len(),
            archive_base64: STANDARD.encode(archive),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_keys_default() {
        let params: GenerateParams = serde_json::from_value(serde_json::json!({
            "customer_name": "acme",
            "sap_version": "S4HANA",
            "config_files": {},
            "quote_fields": []
        }))
        .unwrap();

        assert!(params.custom_fields.is_none());
        assert!(params.special_logic.is_none());
        assert!(!params.fork_session);

        let request = params.into_request().unwrap();
        assert_eq!(request.sap_version, SapVersion::S4Hana);
        assert!(request.custom_fields.is_empty());
        assert!(request.resume_session_id.is_none());
    }

    #[test]
    fn test_missing_required_key_rejected() {
        let result: std::result::Result<GenerateParams, _> =
            serde_json::from_value(serde_json::json!({
                "customer_name": "acme",
                "sap_version": "ECC6",
                "quote_fields": []
            }));
        assert!(result.is_err());
    }

    #[test]
    fn test_mistyped_key_rejected() {
        let result: std::result::Result<GenerateParams, _> =
            serde_json::from_value(serde_json::json!({
                "customer_name": "acme",
                "sap_version": "ECC6",
                "config_files": {},
                "quote_fields": "customer_id"
            }));
        assert!(result.is_err());
    }

    #[test]
    fn test_resume_and_fork() {
        let params: GenerateParams = serde_json::from_value(serde_json::json!({
            "customer_name": "acme",
            "sap_version": "ECC6",
            "config_files": {},
            "quote_fields": ["customer_id"],
            "resume_session_id": "abc123",
            "fork_session": true
        }))
        .unwrap();

        let request = params.into_request().unwrap();
        assert_eq!(request.resume_session_id, Some(SessionId::new("abc123")));
        assert!(request.fork_session);
    }

    #[test]
    fn test_invalid_customer_name() {
        let params: GenerateParams = serde_json::from_value(serde_json::json!({
            "customer_name": "../etc",
            "sap_version": "ECC6",
            "config_files": {},
            "quote_fields": []
        }))
        .unwrap();

        assert!(params.into_request().unwrap_err().is_validation_error());
    }

    #[test]
    fn test_download_result_encoding() {
        let customer = CustomerName::new("acme").unwrap();
        let result = DownloadResult::encode(&customer, b"PK\x03\x04");

        assert_eq!(result.customer, "acme");
        assert_eq!(result.size_bytes, 4);
        assert_eq!(STANDARD.decode(&result.archive_base64).unwrap(), b"PK\x03\x04");
    }
}
