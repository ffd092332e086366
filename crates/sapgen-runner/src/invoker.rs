//! The generation operation.

use crate::command::GeneratorCommand;
use crate::process::kill_group;
use crate::session::{MarkerExtractor, SessionExtractor};
use crate::staging::StagedConfig;
use crate::task::run_blocking;
use sapgen_core::{
    CustomerName, Error, GenerationRequest, GenerationResult, Result, ServiceConfig,
};
use sapgen_store::{CustomerLocks, OutputStore, scan};
use std::ffi::OsString;
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;

/// Where the provider API key comes from.
#[derive(Clone)]
enum ApiKeySource {
    /// Read from the service's own environment at call time.
    Environment,
    /// Supplied explicitly.
    Fixed(OsString),
}

impl std::fmt::Debug for ApiKeySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Environment => f.write_str("Environment"),
            Self::Fixed(_) => f.write_str("Fixed(<redacted>)"),
        }
    }
}

/// Runs the external generator for one customer at a time.
///
/// Cloning is cheap; clones share the lock registry, so concurrent
/// generations for the same customer are serialized across all of them.
///
/// # Examples
///
/// ```no_run
/// use sapgen_core::{CustomerName, GenerationRequest, SapVersion, ServiceConfig};
/// use sapgen_runner::GenerationInvoker;
/// use sapgen_store::VolumeStore;
/// use std::sync::Arc;
///
/// # async fn example() -> sapgen_core::Result<()> {
/// let config = ServiceConfig::default();
/// let store = Arc::new(VolumeStore::new(&config.store_root));
/// let invoker = GenerationInvoker::new(Arc::new(config), store);
///
/// let request = GenerationRequest::builder(CustomerName::new("acme")?, SapVersion::Ecc6)
///     .config_file("VBAK_structure.txt", "Table: VBAK")
///     .quote_field("customer_id")
///     .build();
///
/// let result = invoker.generate(&request).await?;
/// println!("{} files, session {:?}", result.files.len(), result.session_id);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct GenerationInvoker {
    config: Arc<ServiceConfig>,
    store: Arc<dyn OutputStore>,
    locks: CustomerLocks,
    extractor: Arc<dyn SessionExtractor>,
    api_key: ApiKeySource,
}

impl GenerationInvoker {
    /// Creates an invoker that reads the API key from the environment and
    /// extracts session identifiers with the configured marker.
    #[must_use]
    pub fn new(config: Arc<ServiceConfig>, store: Arc<dyn OutputStore>) -> Self {
        let extractor = Arc::new(MarkerExtractor::new(config.session_marker.clone()));
        Self {
            config,
            store,
            locks: CustomerLocks::new(),
            extractor,
            api_key: ApiKeySource::Environment,
        }
    }

    /// Replaces the session extractor.
    #[must_use]
    pub fn with_extractor(mut self, extractor: Arc<dyn SessionExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    /// Shares an existing lock registry.
    #[must_use]
    pub fn with_locks(mut self, locks: CustomerLocks) -> Self {
        self.locks = locks;
        self
    }

    /// Uses a fixed API key instead of reading the environment.
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<OsString>) -> Self {
        self.api_key = ApiKeySource::Fixed(key.into());
        self
    }

    /// Service configuration in use.
    #[must_use]
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Output store the generator writes into.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn OutputStore> {
        &self.store
    }

    /// Lock registry held by generations.
    ///
    /// Acquiring a customer's lock waits until that customer's in-flight
    /// generation has committed.
    #[must_use]
    pub const fn locks(&self) -> &CustomerLocks {
        &self.locks
    }

    /// Runs the generator for one request.
    ///
    /// Holds the customer's lock for the whole invocation. A nonzero exit code
    /// is not an error: the result carries it together with whatever files the
    /// generator managed to write.
    ///
    /// Once the API key has been resolved the generation runs on its own task.
    /// Dropping the returned future does not cancel it; only the configured
    /// timeout does.
    ///
    /// # Errors
    ///
    /// - `Error::ConfigError` if the API key variable is unset (nothing is spawned)
    /// - `Error::ValidationError` if a config file name is not a plain file name
    /// - `Error::SpawnFailed` if the generator cannot be started
    /// - `Error::Timeout` if the generator exceeds the configured limit; its
    ///   process group is killed
    /// - `Error::Io` if staging or committing fails
    /// - `Error::Internal` if the generation task panics
    pub async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResult> {
        let api_key = self.resolve_api_key()?;
        let invoker = self.clone();
        let request = request.clone();

        tokio::spawn(async move { invoker.run(&request, api_key).await }.in_current_span())
            .await
            .map_err(|e| Error::Internal {
                message: format!("generation task failed: {e}"),
            })?
    }

    async fn run(
        &self,
        request: &GenerationRequest,
        api_key: OsString,
    ) -> Result<GenerationResult> {
        let customer = request.customer.clone();

        if !request.sap_version.is_known() {
            tracing::warn!(
                customer = %customer,
                sap_version = %request.sap_version,
                "Unrecognized SAP version, forwarding unchanged"
            );
        }

        let _guard = self.locks.acquire(&customer).await;
        tracing::debug!(customer = %customer, "Acquired customer lock");

        let files = request.config_files.clone();
        let scratch_parent = self.config.scratch_dir.clone();
        let staged =
            run_blocking(move || StagedConfig::stage(&files, scratch_parent.as_deref())).await?;

        let command = GeneratorCommand::new(
            &self.config.program,
            &self.config.program_args,
            request,
            staged.paths(),
            self.store.root(),
        );

        tracing::info!(
            customer = %customer,
            sap_version = %request.sap_version,
            config_files = staged.paths().len(),
            fields = request.quote_fields.len(),
            resume = request.resume_session_id.is_some(),
            "Starting generation"
        );
        tracing::debug!(command = %command.display(), "Generator command");

        let mut process = command.to_tokio();
        process.env(&self.config.api_key_env, api_key);

        let child = process.spawn().map_err(|source| Error::SpawnFailed {
            program: self.config.program.clone(),
            source,
        })?;
        let pid = child.id();

        let started = Instant::now();
        let limit = self.config.generation_timeout();
        let waited = tokio::time::timeout(limit, child.wait_with_output()).await;

        // Helpers the generator started must not outlive the lock
        if let Some(pid) = pid {
            kill_group(pid);
        }

        let output = match waited {
            Ok(output) => output.map_err(|e| Error::io("waiting for generator", e))?,
            Err(_) => {
                tracing::error!(
                    customer = %customer,
                    timeout_secs = limit.as_secs(),
                    "Generator timed out, process group killed"
                );
                if let Err(e) = self.commit(customer.clone()).await {
                    tracing::warn!(customer = %customer, error = %e, "Commit after timeout failed");
                }
                return Err(Error::Timeout {
                    operation: format!("generate {customer}"),
                    duration_secs: limit.as_secs(),
                });
            }
        };
        drop(staged);

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        // Killed by a signal
        let exit_code = output.status.code().unwrap_or(-1);
        let session_id = self.extractor.extract(&stdout);

        let root = self.store.root().to_path_buf();
        let scan_customer = customer.clone();
        let scanned =
            run_blocking(move || Ok(scan::list_readable_files(&root, &scan_customer))).await;
        let committed = self.commit(customer.clone()).await;
        let (files, unreadable) = scanned?;
        committed?;

        if unreadable > 0 {
            tracing::warn!(
                customer = %customer,
                unreadable,
                "Some generated entries could not be read"
            );
        }

        if exit_code == 0 {
            tracing::info!(
                customer = %customer,
                files = files.len(),
                session_id = ?session_id.as_ref().map(sapgen_core::SessionId::as_str),
                elapsed_ms = started.elapsed().as_millis(),
                "Generation finished"
            );
        } else {
            tracing::warn!(
                customer = %customer,
                exit_code,
                files = files.len(),
                elapsed_ms = started.elapsed().as_millis(),
                "Generator exited with failure"
            );
        }

        Ok(GenerationResult {
            session_id,
            output_dir: self.store.customer_dir(&customer).display().to_string(),
            files,
            stdout,
            stderr,
            exit_code,
        })
    }

    fn resolve_api_key(&self) -> Result<OsString> {
        let key = match &self.api_key {
            ApiKeySource::Fixed(key) => Some(key.clone()),
            ApiKeySource::Environment => std::env::var_os(&self.config.api_key_env),
        };

        key.filter(|k| !k.is_empty()).ok_or_else(|| Error::ConfigError {
            message: format!("{} is not set", self.config.api_key_env),
        })
    }

    async fn commit(&self, customer: CustomerName) -> Result<()> {
        let store = Arc::clone(&self.store);
        run_blocking(move || store.commit(&customer)).await
    }
}
