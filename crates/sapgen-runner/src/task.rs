//! Blocking work helper.

use sapgen_core::{Error, Result};

/// Runs filesystem work on the blocking thread pool.
///
/// # Errors
///
/// Returns whatever `f` returns, or `Error::Internal` if the task panicked
/// or was cancelled.
pub async fn run_blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| Error::Internal {
            message: format!("blocking task failed: {e}"),
        })?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_passes_result_through() {
        assert_eq!(run_blocking(|| Ok(7)).await.unwrap(), 7);

        let err = run_blocking::<(), _>(|| {
            Err(Error::ConfigError {
                message: "nope".to_string(),
            })
        })
        .await
        .unwrap_err();
        assert!(err.is_config_error());
    }

    #[tokio::test]
    async fn test_panic_becomes_internal_error() {
        let err = run_blocking::<(), _>(|| panic!("boom")).await.unwrap_err();
        assert!(matches!(err, Error::Internal { .. }));
    }
}
