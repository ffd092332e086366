//! Recursive scans of customer output directories.

use sapgen_core::{CustomerName, Error, Result};
use std::path::Path;
use walkdir::WalkDir;

/// Lists a customer's regular files, relative to the store root.
///
/// Paths use `/` separators and are sorted. A missing customer directory
/// yields an empty list: a failed generation may not have written anything.
///
/// # Errors
///
/// Returns `Error::Io` if the directory tree cannot be read.
///
/// # Examples
///
/// ```
/// use sapgen_core::CustomerName;
/// use sapgen_store::scan::list_files;
///
/// # let temp = tempfile::TempDir::new().unwrap();
/// let acme = CustomerName::new("acme").unwrap();
/// std::fs::create_dir_all(temp.path().join("acme/src")).unwrap();
/// std::fs::write(temp.path().join("acme/src/main.ts"), "").unwrap();
///
/// let files = list_files(temp.path(), &acme).unwrap();
/// assert_eq!(files, vec!["acme/src/main.ts"]);
/// ```
pub fn list_files(root: &Path, customer: &CustomerName) -> Result<Vec<String>> {
    let dir = root.join(customer);
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    walk_files(&dir, |path| {
        if let Some(relative) = relative_path(root, path) {
            files.push(relative);
        }
    })?;
    files.sort();
    Ok(files)
}

/// Like [`list_files`], but skips entries that cannot be read.
///
/// Returns the readable files, sorted, and the number of entries skipped.
/// Used after a generation, where the generator may have left directories
/// behind that this process is not allowed to open.
#[must_use]
pub fn list_readable_files(root: &Path, customer: &CustomerName) -> (Vec<String>, usize) {
    let dir = root.join(customer);
    if !dir.is_dir() {
        return (Vec::new(), 0);
    }

    let mut files = Vec::new();
    let mut skipped = 0;
    for entry in WalkDir::new(&dir).sort_by_file_name() {
        match entry {
            Ok(entry) if entry.file_type().is_file() => {
                if let Some(relative) = relative_path(root, entry.path()) {
                    files.push(relative);
                }
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(error = %e, "Skipping unreadable entry");
                skipped += 1;
            }
        }
    }
    files.sort();
    (files, skipped)
}

/// Counts regular files below `dir`, recursively.
///
/// # Errors
///
/// Returns `Error::Io` if the directory tree cannot be read.
pub fn count_files(dir: &Path) -> Result<usize> {
    let mut count = 0;
    walk_files(dir, |_| count += 1)?;
    Ok(count)
}

/// Calls `visit` for every regular file below `dir`, in file name order.
///
/// Symbolic links are not followed.
pub(crate) fn walk_files(dir: &Path, mut visit: impl FnMut(&Path)) -> Result<()> {
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|e| Error::io(format!("walking {}", dir.display()), e.into()))?;
        if entry.file_type().is_file() {
            visit(entry.path());
        }
    }
    Ok(())
}

/// Renders `path` relative to `base` with `/` separators.
///
/// Returns `None` if `path` is not below `base`.
#[must_use]
pub fn relative_path(base: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(base).ok()?;
    let parts: Vec<_> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect();
    if parts.is_empty() {
        return None;
    }
    Some(parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_list_files_missing_customer() {
        let temp = TempDir::new().unwrap();
        let acme = CustomerName::new("acme").unwrap();
        assert!(list_files(temp.path(), &acme).unwrap().is_empty());
    }

    #[test]
    fn test_list_files_ignores_directories_and_other_customers() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("acme/src/empty")).unwrap();
        fs::create_dir_all(temp.path().join("globex")).unwrap();
        fs::write(temp.path().join("acme/README.md"), "# acme").unwrap();
        fs::write(temp.path().join("acme/src/index.ts"), "").unwrap();
        fs::write(temp.path().join("globex/other.ts"), "").unwrap();

        let acme = CustomerName::new("acme").unwrap();
        let files = list_files(temp.path(), &acme).unwrap();
        assert_eq!(files, vec!["acme/README.md", "acme/src/index.ts"]);
    }

    #[test]
    fn test_list_readable_files_matches_list_files() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("acme/src")).unwrap();
        fs::write(temp.path().join("acme/README.md"), "# acme").unwrap();
        fs::write(temp.path().join("acme/src/index.ts"), "").unwrap();

        let acme = CustomerName::new("acme").unwrap();
        let (files, skipped) = list_readable_files(temp.path(), &acme);
        assert_eq!(files, list_files(temp.path(), &acme).unwrap());
        assert_eq!(skipped, 0);

        let ghost = CustomerName::new("ghost").unwrap();
        assert_eq!(list_readable_files(temp.path(), &ghost), (Vec::new(), 0));
    }

    #[cfg(unix)]
    #[test]
    fn test_list_readable_files_skips_locked_directory() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let locked = temp.path().join("acme/locked");
        fs::create_dir_all(&locked).unwrap();
        fs::write(temp.path().join("acme/ok.ts"), "").unwrap();
        fs::write(locked.join("secret.ts"), "").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        let acme = CustomerName::new("acme").unwrap();
        let (files, _skipped) = list_readable_files(temp.path(), &acme);

        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        // Root can still read the locked directory
        assert!(files.contains(&"acme/ok.ts".to_string()));
    }

    #[test]
    fn test_count_files_recursive() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("a/b/c")).unwrap();
        fs::write(temp.path().join("a/1.txt"), "").unwrap();
        fs::write(temp.path().join("a/b/2.txt"), "").unwrap();
        fs::write(temp.path().join("a/b/c/3.txt"), "").unwrap();

        assert_eq!(count_files(&temp.path().join("a")).unwrap(), 3);
    }

    #[test]
    fn test_relative_path() {
        let base = Path::new("/output");
        assert_eq!(
            relative_path(base, Path::new("/output/acme/src/x.ts")),
            Some("acme/src/x.ts".to_string())
        );
        assert_eq!(relative_path(base, Path::new("/output")), None);
        assert_eq!(relative_path(base, Path::new("/elsewhere/x.ts")), None);
    }
}
