//! Customer listing.

use crate::OutputStore;
use crate::scan::count_files;
use chrono::{DateTime, Utc};
use sapgen_core::{CustomerRecord, Error, Result};

/// Lists customer directories in the store, most recently modified first.
///
/// Every top-level directory counts as a customer; plain files at the top
/// level are skipped. A missing store root yields an empty list. Entries with
/// the same modification time are ordered by name.
///
/// # Errors
///
/// Returns `Error::Io` if the store root or a customer directory cannot be read.
pub fn list_customers<S>(store: &S) -> Result<Vec<CustomerRecord>>
where
    S: OutputStore + ?Sized,
{
    let root = store.root();
    if !root.is_dir() {
        return Ok(Vec::new());
    }

    let entries = std::fs::read_dir(root)
        .map_err(|e| Error::io(format!("reading store root {}", root.display()), e))?;

    let mut customers = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| Error::io("reading store entry", e))?;
        let path = entry.path();
        let metadata = entry
            .metadata()
            .map_err(|e| Error::io(format!("reading metadata of {}", path.display()), e))?;
        if !metadata.is_dir() {
            continue;
        }

        let modified = metadata
            .modified()
            .map_err(|e| Error::io(format!("reading mtime of {}", path.display()), e))?;

        customers.push(CustomerRecord {
            name: entry.file_name().to_string_lossy().into_owned(),
            modified: DateTime::<Utc>::from(modified),
            file_count: count_files(&path)?,
        });
    }

    customers.sort_by(|a, b| b.modified.cmp(&a.modified).then_with(|| a.name.cmp(&b.name)));
    Ok(customers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::VolumeStore;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_missing_root_is_empty() {
        let temp = TempDir::new().unwrap();
        let store = VolumeStore::new(temp.path().join("missing"));
        assert!(list_customers(&store).unwrap().is_empty());
    }

    #[test]
    fn test_top_level_files_skipped() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("stray.txt"), "").unwrap();
        fs::create_dir(temp.path().join("acme")).unwrap();

        let store = VolumeStore::new(temp.path());
        let customers = list_customers(&store).unwrap();
        assert_eq!(customers.len(), 1);
        assert_eq!(customers[0].name, "acme");
        assert_eq!(customers[0].file_count, 0);
    }
}
