//! Service configuration.
//!
//! Defaults reproduce the reference deployment: generated code lives under
//! `/output`, the generator is `node /app/dist/cli.js`, and the provider key is
//! read from `ANTHROPIC_API_KEY`. Every field can be overridden from a TOML
//! file; the binary applies command-line overrides on top.
//!
//! # Examples
//!
//! ```
//! use sapgen_core::ServiceConfig;
//! use std::time::Duration;
//!
//! let config = ServiceConfig::default();
//! assert_eq!(config.generation_timeout(), Duration::from_secs(30 * 60));
//!
//! let custom = ServiceConfig::builder()
//!     .store_root("/tmp/sapgen")
//!     .generation_timeout(Duration::from_secs(60))
//!     .build();
//! assert!(custom.validate().is_ok());
//! ```

use crate::{Error, Result, validate_program};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default generation wall-clock limit: 30 minutes.
const DEFAULT_TIMEOUT_SECS: u64 = 30 * 60;

/// Default request body limit: 10 MiB.
const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Runtime configuration for the generator service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
    /// Root of the persistent output store (one directory per customer).
    ///
    /// Default: `/output`
    pub store_root: PathBuf,

    /// Generator program, a bare name resolved through `PATH` or an absolute path.
    ///
    /// Default: `node`
    pub program: String,

    /// Arguments placed before the `quote` subcommand.
    ///
    /// Default: `["/app/dist/cli.js"]`
    pub program_args: Vec<String>,

    /// Environment variable holding the provider API key.
    ///
    /// The variable must be set for the service process and is forwarded to
    /// the generator under the same name.
    /// Default: `ANTHROPIC_API_KEY`
    pub api_key_env: String,

    /// Wall-clock limit for one generation, in seconds.
    ///
    /// Default: 1800
    pub generation_timeout_secs: u64,

    /// Marker preceding the session identifier in the generator's stdout.
    ///
    /// Default: `Session ID:`
    pub session_marker: String,

    /// Parent directory for per-invocation scratch directories.
    ///
    /// If `None`, the system temporary directory is used.
    /// Default: None
    pub scratch_dir: Option<PathBuf>,

    /// Address the HTTP facade binds to.
    ///
    /// Default: `0.0.0.0:8000`
    pub bind_addr: String,

    /// Maximum accepted HTTP request body size in bytes.
    ///
    /// Default: 10 MiB
    pub max_body_bytes: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            store_root: PathBuf::from("/output"),
            program: "node".to_string(),
            program_args: vec!["/app/dist/cli.js".to_string()],
            api_key_env: "ANTHROPIC_API_KEY".to_string(),
            generation_timeout_secs: DEFAULT_TIMEOUT_SECS,
            session_marker: "Session ID:".to_string(),
            scratch_dir: None,
            bind_addr: "0.0.0.0:8000".to_string(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl ServiceConfig {
    /// Creates a new configuration builder.
    #[must_use]
    pub fn builder() -> ServiceConfigBuilder {
        ServiceConfigBuilder::new()
    }

    /// Returns the generation timeout as a `Duration`.
    #[must_use]
    pub const fn generation_timeout(&self) -> Duration {
        Duration::from_secs(self.generation_timeout_secs)
    }

    /// Parses a configuration from TOML text.
    ///
    /// Missing keys take their default values.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` if the text is not valid TOML or contains
    /// unknown keys.
    ///
    /// # Examples
    ///
    /// ```
    /// use sapgen_core::ServiceConfig;
    ///
    /// let config = ServiceConfig::from_toml_str(r#"
    ///     store_root = "/data/output"
    ///     generation_timeout_secs = 600
    /// "#).unwrap();
    ///
    /// assert_eq!(config.store_root.to_str(), Some("/data/output"));
    /// assert_eq!(config.program, "node");
    /// ```
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::ConfigError {
            message: format!("Invalid configuration: {e}"),
        })
    }

    /// Loads a configuration file.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the file cannot be read, or `Error::ConfigError`
    /// if it cannot be parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::io(format!("reading config file {}", path.display()), e))?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), "Loaded service configuration");
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` if:
    /// - The store root is empty
    /// - The generator program is invalid (see [`validate_program`])
    /// - The API key variable name is empty or contains `=`
    /// - The timeout or the body limit is zero
    /// - The session marker is empty
    pub fn validate(&self) -> Result<()> {
        if self.store_root.as_os_str().is_empty() {
            return Err(config_error("Store root cannot be empty"));
        }

        validate_program(&self.program)?;

        if self.api_key_env.is_empty() || self.api_key_env.contains(['=', '\0']) {
            return Err(config_error(
                "API key variable name must be non-empty and must not contain '='",
            ));
        }

        if self.generation_timeout_secs == 0 {
            return Err(config_error("Generation timeout must be greater than zero"));
        }

        if self.session_marker.trim().is_empty() {
            return Err(config_error("Session marker cannot be empty"));
        }

        if self.max_body_bytes == 0 {
            return Err(config_error("Maximum body size must be greater than zero"));
        }

        Ok(())
    }
}

fn config_error(message: &str) -> Error {
    Error::ConfigError {
        message: message.to_string(),
    }
}

/// Builder for [`ServiceConfig`].
///
/// # Examples
///
/// ```
/// use sapgen_core::ServiceConfig;
///
/// let config = ServiceConfig::builder()
///     .program("/usr/local/bin/sap-generator")
///     .program_args(Vec::new())
///     .api_key_env("GENERATOR_API_KEY")
///     .build();
///
/// assert!(config.program_args.is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ServiceConfigBuilder {
    config: ServiceConfig,
}

impl ServiceConfigBuilder {
    /// Creates a builder initialized with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the output store root.
    #[must_use]
    pub fn store_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.store_root = root.into();
        self
    }

    /// Sets the generator program.
    #[must_use]
    pub fn program(mut self, program: impl Into<String>) -> Self {
        self.config.program = program.into();
        self
    }

    /// Sets the arguments placed before the `quote` subcommand.
    #[must_use]
    pub fn program_args(mut self, args: Vec<String>) -> Self {
        self.config.program_args = args;
        self
    }

    /// Sets the API key variable name.
    #[must_use]
    pub fn api_key_env(mut self, name: impl Into<String>) -> Self {
        self.config.api_key_env = name.into();
        self
    }

    /// Sets the generation timeout.
    #[must_use]
    pub const fn generation_timeout(mut self, timeout: Duration) -> Self {
        self.config.generation_timeout_secs = timeout.as_secs();
        self
    }

    /// Sets the session marker.
    #[must_use]
    pub fn session_marker(mut self, marker: impl Into<String>) -> Self {
        self.config.session_marker = marker.into();
        self
    }

    /// Sets the parent directory for scratch directories.
    #[must_use]
    pub fn scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.scratch_dir = Some(dir.into());
        self
    }

    /// Sets the HTTP bind address.
    #[must_use]
    pub fn bind_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.bind_addr = addr.into();
        self
    }

    /// Sets the maximum request body size.
    #[must_use]
    pub const fn max_body_bytes(mut self, bytes: usize) -> Self {
        self.config.max_body_bytes = bytes;
        self
    }

    /// Builds the configuration.
    #[must_use]
    pub fn build(self) -> ServiceConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_deployment() {
        let config = ServiceConfig::default();
        assert_eq!(config.store_root, PathBuf::from("/output"));
        assert_eq!(config.program, "node");
        assert_eq!(config.program_args, vec!["/app/dist/cli.js"]);
        assert_eq!(config.api_key_env, "ANTHROPIC_API_KEY");
        assert_eq!(config.generation_timeout(), Duration::from_secs(1800));
        assert_eq!(config.session_marker, "Session ID:");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_timeout_invalid() {
        let config = ServiceConfig::builder()
            .generation_timeout(Duration::ZERO)
            .build();
        assert!(config.validate().unwrap_err().is_config_error());
    }

    #[test]
    fn test_bad_api_key_env_invalid() {
        let config = ServiceConfig::builder().api_key_env("A=B").build();
        assert!(config.validate().is_err());

        let config = ServiceConfig::builder().api_key_env("").build();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_marker_invalid() {
        let config = ServiceConfig::builder().session_marker("  ").build();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_program_is_validated() {
        let config = ServiceConfig::builder().program("node | tee").build();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_partial_overrides() {
        let config = ServiceConfig::from_toml_str(
            r#"
            program = "sap-generator"
            program_args = []
            session_marker = "SESSION="
            "#,
        )
        .unwrap();
        assert_eq!(config.program, "sap-generator");
        assert!(config.program_args.is_empty());
        assert_eq!(config.session_marker, "SESSION=");
        assert_eq!(config.store_root, PathBuf::from("/output"));
    }

    #[test]
    fn test_toml_unknown_key_rejected() {
        let err = ServiceConfig::from_toml_str("stor_root = \"/x\"").unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_load_missing_file() {
        let err = ServiceConfig::load("/nonexistent/sapgen.toml").unwrap_err();
        assert!(err.is_io_error());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("sapgen.toml");
        std::fs::write(&path, "bind_addr = \"127.0.0.1:9000\"\n").unwrap();

        let config = ServiceConfig::load(&path).unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:9000");
    }
}
