//! Output store handle and the filesystem-backed implementation.

use sapgen_core::{CustomerName, Error, Result};
use std::fmt::Debug;
use std::fs::File;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Handle to the persistent output store.
///
/// The store holds one directory per customer below [`root`](Self::root).
/// Implementations decide what "commit" means: for a local directory it
/// flushes written data to disk, for a network volume it publishes recent
/// writes so other readers observe them.
pub trait OutputStore: Send + Sync + Debug {
    /// Root directory of the store, passed to the generator as `--output`.
    fn root(&self) -> &Path;

    /// Directory holding a customer's generated code.
    fn customer_dir(&self, customer: &CustomerName) -> PathBuf {
        self.root().join(customer)
    }

    /// Makes the customer's recent writes durable and visible to other readers.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if flushing fails.
    fn commit(&self, customer: &CustomerName) -> Result<()>;
}

/// Output store backed by a directory on a local or mounted volume.
#[derive(Debug, Clone)]
pub struct VolumeStore {
    root: PathBuf,
}

impl VolumeStore {
    /// Creates a store rooted at `root`. The directory is not created.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Creates the store root if it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the directory cannot be created.
    pub fn ensure_root(&self) -> Result<()> {
        std::fs::create_dir_all(&self.root)
            .map_err(|e| Error::io(format!("creating store root {}", self.root.display()), e))
    }
}

impl OutputStore for VolumeStore {
    fn root(&self) -> &Path {
        &self.root
    }

    fn commit(&self, customer: &CustomerName) -> Result<()> {
        let dir = self.customer_dir(customer);
        if !dir.is_dir() {
            tracing::debug!(customer = %customer, "Nothing to commit, customer directory missing");
            return Ok(());
        }

        let mut synced = 0usize;
        let mut skipped = 0usize;
        for entry in WalkDir::new(&dir) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!(customer = %customer, error = %e, "Skipping unreadable entry");
                    skipped += 1;
                    continue;
                }
            };
            let file_type = entry.file_type();
            if !(file_type.is_file() || (cfg!(unix) && file_type.is_dir())) {
                continue;
            }
            match sync_path(entry.path()) {
                Ok(()) => synced += 1,
                Err(e) if e.kind() == ErrorKind::PermissionDenied => {
                    tracing::warn!(
                        customer = %customer,
                        path = %entry.path().display(),
                        "Skipping entry without read permission"
                    );
                    skipped += 1;
                }
                Err(e) => {
                    return Err(Error::io(format!("syncing {}", entry.path().display()), e));
                }
            }
        }

        if cfg!(unix) {
            sync_path(&self.root)
                .map_err(|e| Error::io(format!("syncing {}", self.root.display()), e))?;
        }

        tracing::debug!(customer = %customer, entries = synced, skipped, "Committed output store");
        Ok(())
    }
}

fn sync_path(path: &Path) -> std::io::Result<()> {
    File::open(path)?.sync_all()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_customer_dir_joins_root() {
        let store = VolumeStore::new("/output");
        let acme = CustomerName::new("acme").unwrap();
        assert_eq!(store.customer_dir(&acme), PathBuf::from("/output/acme"));
    }

    #[test]
    fn test_commit_missing_customer_is_noop() {
        let temp = TempDir::new().unwrap();
        let store = VolumeStore::new(temp.path());
        let ghost = CustomerName::new("ghost").unwrap();

        store.commit(&ghost).unwrap();
        assert!(!store.customer_dir(&ghost).exists());
    }

    #[test]
    fn test_commit_nested_files() {
        let temp = TempDir::new().unwrap();
        let store = VolumeStore::new(temp.path());
        let acme = CustomerName::new("acme").unwrap();
        let nested = store.customer_dir(&acme).join("src/handlers");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(nested.join("quote.ts"), "export {}").unwrap();

        store.commit(&acme).unwrap();
        assert!(nested.join("quote.ts").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_commit_skips_locked_directory() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let store = VolumeStore::new(temp.path());
        let acme = CustomerName::new("acme").unwrap();
        let locked = store.customer_dir(&acme).join("locked");
        std::fs::create_dir_all(&locked).unwrap();
        std::fs::write(store.customer_dir(&acme).join("ok.ts"), "").unwrap();
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o000)).unwrap();

        let committed = store.commit(&acme);
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o755)).unwrap();

        committed.unwrap();
    }

    #[test]
    fn test_ensure_root_creates_directory() {
        let temp = TempDir::new().unwrap();
        let store = VolumeStore::new(temp.path().join("volume"));
        store.ensure_root().unwrap();
        assert!(store.root().is_dir());
    }
}
