//! Zip archives of a customer's generated code.

use crate::OutputStore;
use crate::scan::{relative_path, walk_files};
use sapgen_core::{CustomerName, Error, Result};
use std::io::{Cursor, Write};
use std::path::Path;
use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// Builds an in-memory zip archive of everything under a customer's directory.
///
/// Entry names are relative to the customer directory and use `/`
/// separators. The store is only read.
///
/// # Errors
///
/// Returns `Error::CustomerNotFound` if the customer has no output directory,
/// `Error::Io` if a file cannot be read, or `Error::ArchiveError` if the
/// archive cannot be written.
///
/// # Examples
///
/// ```
/// use sapgen_core::CustomerName;
/// use sapgen_store::{VolumeStore, build_archive};
///
/// # let temp = tempfile::TempDir::new().unwrap();
/// let store = VolumeStore::new(temp.path());
/// let missing = CustomerName::new("nobody").unwrap();
///
/// let err = build_archive(&store, &missing).unwrap_err();
/// assert!(err.is_not_found());
/// ```
pub fn build_archive<S>(store: &S, customer: &CustomerName) -> Result<Vec<u8>>
where
    S: OutputStore + ?Sized,
{
    let dir = store.customer_dir(customer);
    if !dir.is_dir() {
        return Err(Error::CustomerNotFound {
            customer: customer.to_string(),
        });
    }

    let mut files = Vec::new();
    walk_files(&dir, |path| files.push(path.to_path_buf()))?;

    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

    for path in &files {
        let Some(name) = relative_path(&dir, path) else {
            continue;
        };
        add_file(&mut writer, &name, path, options)?;
    }

    let cursor = writer.finish().map_err(|e| archive_error("finishing archive", e))?;
    let bytes = cursor.into_inner();

    tracing::debug!(
        customer = %customer,
        files = files.len(),
        size_bytes = bytes.len(),
        "Built customer archive"
    );
    Ok(bytes)
}

fn add_file(
    writer: &mut ZipWriter<Cursor<Vec<u8>>>,
    name: &str,
    path: &Path,
    options: SimpleFileOptions,
) -> Result<()> {
    let contents =
        std::fs::read(path).map_err(|e| Error::io(format!("reading {}", path.display()), e))?;

    writer
        .start_file(name, options)
        .map_err(|e| archive_error(&format!("adding {name}"), e))?;
    writer
        .write_all(&contents)
        .map_err(|e| archive_error(&format!("writing {name}"), e))?;
    Ok(())
}

fn archive_error(
    action: &str,
    source: impl std::error::Error + Send + Sync + 'static,
) -> Error {
    Error::ArchiveError {
        message: format!("{action}: {source}"),
        source: Some(Box::new(source)),
    }
}
