//! Shared application state.
//!
//! Both facades call into [`AppState`], which owns the invoker and runs the
//! read-only store operations on the blocking pool.

use sapgen_core::{
    CustomerName, CustomerRecord, GenerationRequest, GenerationResult, Result, ServiceConfig,
};
use sapgen_runner::{GenerationInvoker, run_blocking};
use sapgen_store::{OutputStore, build_archive, list_customers};
use std::sync::Arc;

/// Operations exposed by the HTTP and MCP facades.
#[derive(Debug, Clone)]
pub struct AppState {
    invoker: GenerationInvoker,
}

impl AppState {
    /// Creates state around a configuration and an output store.
    #[must_use]
    pub fn new(config: ServiceConfig, store: Arc<dyn OutputStore>) -> Self {
        Self::from_invoker(GenerationInvoker::new(Arc::new(config), store))
    }

    /// Wraps an already configured invoker.
    #[must_use]
    pub const fn from_invoker(invoker: GenerationInvoker) -> Self {
        Self { invoker }
    }

    /// Service configuration in use.
    #[must_use]
    pub fn config(&self) -> &ServiceConfig {
        self.invoker.config()
    }

    /// Runs one generation.
    ///
    /// # Errors
    ///
    /// See [`GenerationInvoker::generate`].
    #[tracing::instrument(skip_all, fields(customer = %request.customer))]
    pub async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResult> {
        self.invoker.generate(request).await
    }

    /// Lists customers with generated output, most recently modified first.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the store cannot be read.
    pub async fn list_customers(&self) -> Result<Vec<CustomerRecord>> {
        let store = Arc::clone(self.invoker.store());
        let customers = run_blocking(move || list_customers(store.as_ref())).await?;
        tracing::debug!(count = customers.len(), "Listed customers");
        Ok(customers)
    }

    /// Builds a zip archive of a customer's generated code.
    ///
    /// # Errors
    ///
    /// Returns `Error::CustomerNotFound` if the customer has no output.
    #[tracing::instrument(skip_all, fields(customer = %customer))]
    pub async fn archive(&self, customer: CustomerName) -> Result<Vec<u8>> {
        let store = Arc::clone(self.invoker.store());
        let bytes = run_blocking(move || build_archive(store.as_ref(), &customer)).await?;
        tracing::info!(size_bytes = bytes.len(), "Built archive");
        Ok(bytes)
    }
}
