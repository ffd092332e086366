//! MCP server facade.
//!
//! The `GeneratorService` exposes three tools over stdio:
//! 1. `generate_endpoint` - Run the generator for one customer
//! 2. `list_customers` - List customers with generated code
//! 3. `download_generated_code` - Fetch a customer's code as a base64 zip

use crate::state::AppState;
use crate::types::{DownloadParams, DownloadResult, GenerateParams};
use rmcp::handler::server::ServerHandler;
use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{ErrorData as McpError, tool, tool_handler, tool_router};
use sapgen_core::{CustomerName, Error};
use serde::Serialize;

/// MCP server for SAP quote endpoint generation.
///
/// # Examples
///
/// ```no_run
/// use rmcp::ServiceExt;
/// use rmcp::transport::stdio;
/// use sapgen_core::ServiceConfig;
/// use sapgen_server::rpc::GeneratorService;
/// use sapgen_server::state::AppState;
/// use sapgen_store::VolumeStore;
/// use std::sync::Arc;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = ServiceConfig::default();
/// let store = Arc::new(VolumeStore::new(&config.store_root));
/// let service = GeneratorService::new(AppState::new(config, store));
///
/// let running = service.serve(stdio()).await?;
/// running.waiting().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct GeneratorService {
    /// Shared operations
    state: AppState,

    /// Tool router for MCP protocol
    tool_router: ToolRouter<Self>,
}

impl GeneratorService {
    /// Creates a new generator service.
    #[must_use]
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            tool_router: Self::tool_router(),
        }
    }
}

#[tool_router]
impl GeneratorService {
    /// Generate SAP integration code for a customer's quote endpoint.
    #[tool(
        description = "Generate SAP integration code for a customer's quote endpoint. Returns the session ID, generated file paths, generator output and exit code. A nonzero exit code is reported, not raised."
    )]
    async fn generate_endpoint(
        &self,
        Parameters(params): Parameters<GenerateParams>,
    ) -> Result<CallToolResult, McpError> {
        let request = params.into_request().map_err(to_mcp_error)?;
        let result = self.state.generate(&request).await.map_err(to_mcp_error)?;
        json_result(&result)
    }

    /// List customers with generated code.
    #[tool(
        description = "List customers with generated code, most recently modified first, with file counts."
    )]
    async fn list_customers(&self) -> Result<CallToolResult, McpError> {
        let customers = self.state.list_customers().await.map_err(to_mcp_error)?;
        json_result(&customers)
    }

    /// Download a customer's generated code as a zip archive.
    #[tool(
        description = "Download all generated code for a customer as a base64-encoded zip archive."
    )]
    async fn download_generated_code(
        &self,
        Parameters(params): Parameters<DownloadParams>,
    ) -> Result<CallToolResult, McpError> {
        let customer = CustomerName::new(params.customer_name).map_err(to_mcp_error)?;
        let archive = self
            .state
            .archive(customer.clone())
            .await
            .map_err(to_mcp_error)?;
        json_result(&DownloadResult::encode(&customer, &archive))
    }
}

#[tool_handler]
impl ServerHandler for GeneratorService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "Generate SAP integration code for customer quote endpoints. \
                 Use generate_endpoint with the customer's SAP config files, then \
                 download_generated_code to fetch the result."
                    .to_string(),
            ),
        }
    }
}

// ============================================================================
// Helper functions
// ============================================================================

fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let text = serde_json::to_string_pretty(value).map_err(|e| {
        to_mcp_error(Error::SerializationError {
            message: "Failed to serialize result".to_string(),
            source: Some(e),
        })
    })?;
    Ok(CallToolResult::success(vec![Content::text(text)]))
}

fn to_mcp_error(err: Error) -> McpError {
    if err.is_validation_error() || err.is_not_found() {
        McpError::invalid_params(err.to_string(), None)
    } else {
        tracing::error!(error = ?err, "Tool call failed");
        McpError::internal_error(err.to_string(), None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rmcp::model::ErrorCode;
    use sapgen_core::{CustomerRecord, ServiceConfig};
    use sapgen_store::VolumeStore;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn service(root: &std::path::Path) -> GeneratorService {
        let config = ServiceConfig::builder().store_root(root).build();
        let store = Arc::new(VolumeStore::new(root));
        GeneratorService::new(AppState::new(config, store))
    }

    #[test]
    fn test_server_info_enables_tools() {
        let temp = TempDir::new().unwrap();
        let info = service(temp.path()).get_info();
        assert!(info.capabilities.tools.is_some());
        assert!(info.instructions.unwrap().contains("generate_endpoint"));
    }

    #[tokio::test]
    async fn test_list_customers_tool() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("acme/src")).unwrap();
        std::fs::write(temp.path().join("acme/src/index.ts"), "x").unwrap();

        let result = service(temp.path()).list_customers().await.unwrap();
        let text_content = result.content[0].as_text().unwrap();
        let parsed: Vec<CustomerRecord> = serde_json::from_str(&text_content.text).unwrap();

        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].name, "acme");
        assert_eq!(parsed[0].file_count, 1);
    }

    #[tokio::test]
    async fn test_download_unknown_customer_is_invalid_params() {
        let temp = TempDir::new().unwrap();
        let err = service(temp.path())
            .download_generated_code(Parameters(DownloadParams {
                customer_name: "nobody".to_string(),
            }))
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
        assert!(err.message.contains("nobody"));
        assert!(!temp.path().join("nobody").exists());
    }

    #[tokio::test]
    async fn test_download_returns_base64_zip() {
        use base64::Engine;

        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("acme")).unwrap();
        std::fs::write(temp.path().join("acme/README.md"), "# acme").unwrap();

        let result = service(temp.path())
            .download_generated_code(Parameters(DownloadParams {
                customer_name: "acme".to_string(),
            }))
            .await
            .unwrap();

        let text_content = result.content[0].as_text().unwrap();
        let payload: DownloadResult = serde_json::from_str(&text_content.text).unwrap();
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(&payload.archive_base64)
            .unwrap();

        assert_eq!(payload.customer, "acme");
        assert_eq!(payload.size_bytes, bytes.len());
        assert!(bytes.starts_with(b"PK"));
    }
}
