//! Validation of the configured generator program.
//!
//! The generator is spawned directly (never through a shell), but its program
//! string comes from configuration, so it is checked once at startup.
//!
//! # Rules
//!
//! - The program must not be empty
//! - Shell metacharacters are rejected
//! - A bare name (`node`) is resolved through `PATH` at spawn time
//! - A path must be absolute, exist, be a regular file, and be executable
//!
//! # Examples
//!
//! ```
//! use sapgen_core::validate_program;
//!
//! assert!(validate_program("node").is_ok());
//! assert!(validate_program("./generator").is_err());
//! assert!(validate_program("node; rm -rf /").is_err());
//! ```

use crate::{Error, Result};
use std::path::Path;

/// Shell metacharacters that indicate a command line rather than a program.
const FORBIDDEN_CHARS: &[char] = &[';', '|', '&', '>', '<', '`', '$', '(', ')', '\n', '\r'];

/// Validates the generator program from configuration.
///
/// # Errors
///
/// Returns `Error::ConfigError` if the program is empty, contains shell
/// metacharacters, or is a path that is relative, missing, not a file, or
/// not executable.
pub fn validate_program(program: &str) -> Result<()> {
    let program = program.trim();
    if program.is_empty() {
        return Err(config_error("Generator program cannot be empty".into()));
    }

    for forbidden in FORBIDDEN_CHARS {
        if program.contains(*forbidden) {
            return Err(config_error(format!(
                "Generator program contains forbidden shell metacharacter: '{forbidden}'"
            )));
        }
    }

    if !program.contains(['/', '\\']) {
        return Ok(());
    }

    let path = Path::new(program);
    if !path.is_absolute() {
        return Err(config_error(format!(
            "Generator program must be a bare name or an absolute path, got: {program}"
        )));
    }

    if !path.exists() {
        return Err(config_error(format!(
            "Generator program does not exist: {program}"
        )));
    }

    if !path.is_file() {
        return Err(config_error(format!(
            "Generator program is not a file: {program}"
        )));
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let metadata = std::fs::metadata(path).map_err(|e| {
            config_error(format!("Cannot read generator program metadata: {e}"))
        })?;

        if metadata.permissions().mode() & 0o111 == 0 {
            return Err(config_error(format!(
                "Generator program is not executable: {program}"
            )));
        }
    }

    Ok(())
}

const fn config_error(message: String) -> Error {
    Error::ConfigError { message }
}
