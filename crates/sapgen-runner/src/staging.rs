//! Config staging.
//!
//! Config file contents arrive as strings. The generator wants paths, so each
//! invocation writes them into its own scratch directory:
//!
//! ```text
//! $TMPDIR/sapgen-XXXXXX/
//! └── config/
//!     ├── VBAK_structure.txt
//!     └── custom_fields.txt
//! ```
//!
//! The scratch directory is removed when the [`StagedConfig`] is dropped.

use sapgen_core::{Error, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Config files written to an invocation-scoped scratch directory.
#[derive(Debug)]
pub struct StagedConfig {
    scratch: TempDir,
    config_dir: PathBuf,
    paths: Vec<PathBuf>,
}

impl StagedConfig {
    /// Writes every config file into a fresh scratch directory.
    ///
    /// Files are written in name order and [`paths`](Self::paths) preserves
    /// that order. When `parent` is `None` the system temporary directory is
    /// used.
    ///
    /// # Errors
    ///
    /// Returns `Error::ValidationError` if a file name is not a single path
    /// component, or `Error::Io` if the directory or a file cannot be written.
    ///
    /// # Examples
    ///
    /// ```
    /// use sapgen_runner::StagedConfig;
    /// use std::collections::BTreeMap;
    ///
    /// let mut files = BTreeMap::new();
    /// files.insert("VBAK_structure.txt".to_string(), "Table: VBAK".to_string());
    ///
    /// let staged = StagedConfig::stage(&files, None).unwrap();
    /// assert_eq!(staged.paths().len(), 1);
    /// assert_eq!(std::fs::read_to_string(&staged.paths()[0]).unwrap(), "Table: VBAK");
    /// ```
    pub fn stage(files: &BTreeMap<String, String>, parent: Option<&Path>) -> Result<Self> {
        for name in files.keys() {
            validate_file_name(name)?;
        }

        let mut builder = tempfile::Builder::new();
        builder.prefix("sapgen-");
        let scratch = parent
            .map_or_else(|| builder.tempdir(), |parent| builder.tempdir_in(parent))
            .map_err(|e| Error::io("creating scratch directory", e))?;

        let config_dir = scratch.path().join("config");
        std::fs::create_dir(&config_dir)
            .map_err(|e| Error::io(format!("creating {}", config_dir.display()), e))?;

        let mut paths = Vec::with_capacity(files.len());
        for (name, content) in files {
            let path = config_dir.join(name);
            std::fs::write(&path, content)
                .map_err(|e| Error::io(format!("writing config file {name}"), e))?;
            paths.push(path);
        }

        tracing::debug!(
            dir = %config_dir.display(),
            files = paths.len(),
            "Staged config files"
        );

        Ok(Self {
            scratch,
            config_dir,
            paths,
        })
    }

    /// Paths of the staged files, in name order.
    #[must_use]
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Directory holding the staged files.
    #[must_use]
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Root of the scratch directory.
    #[must_use]
    pub fn scratch_dir(&self) -> &Path {
        self.scratch.path()
    }
}

fn validate_file_name(name: &str) -> Result<()> {
    let reason = if name.trim().is_empty() {
        Some("file name must not be empty")
    } else if name == "." || name == ".." {
        Some("file name must not be a relative path component")
    } else if name.contains(['/', '\\', '\0']) {
        Some("file name must not contain path separators")
    } else {
        None
    };

    reason.map_or(Ok(()), |reason| {
        Err(Error::ValidationError {
            field: "config_files".to_string(),
            reason: format!("{reason}: {name:?}"),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn files(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_one_file_per_entry_with_identical_content() {
        let input = files(&[
            ("VBAK_structure.txt", "Table: VBAK\nMANDT CLNT 3\n"),
            ("custom_fields.txt", "ZZPRIORITY NUMC 1 Priority Level (1-5)\n"),
            ("unicode.txt", "Ümlaut – ✓\r\n"),
        ]);

        let staged = StagedConfig::stage(&input, None).unwrap();
        assert_eq!(staged.paths().len(), input.len());

        for (path, (name, content)) in staged.paths().iter().zip(&input) {
            assert_eq!(path.file_name().unwrap().to_str().unwrap(), name);
            assert_eq!(std::fs::read(path).unwrap(), content.as_bytes());
        }

        let on_disk = std::fs::read_dir(staged.config_dir()).unwrap().count();
        assert_eq!(on_disk, input.len());
    }

    #[test]
    fn test_concurrent_stagings_do_not_collide() {
        let input = files(&[("same.txt", "a")]);
        let first = StagedConfig::stage(&input, None).unwrap();
        let second = StagedConfig::stage(&files(&[("same.txt", "b")]), None).unwrap();

        assert_ne!(first.scratch_dir(), second.scratch_dir());
        assert_eq!(std::fs::read_to_string(&first.paths()[0]).unwrap(), "a");
        assert_eq!(std::fs::read_to_string(&second.paths()[0]).unwrap(), "b");
    }

    #[test]
    fn test_scratch_removed_on_drop() {
        let staged = StagedConfig::stage(&files(&[("a.txt", "a")]), None).unwrap();
        let scratch = staged.scratch_dir().to_path_buf();
        assert!(scratch.exists());

        drop(staged);
        assert!(!scratch.exists());
    }

    #[test]
    fn test_empty_mapping() {
        let staged = StagedConfig::stage(&BTreeMap::new(), None).unwrap();
        assert!(staged.paths().is_empty());
        assert!(staged.config_dir().is_dir());
    }

    #[test]
    fn test_rejects_path_like_names() {
        for bad in ["../escape.txt", "nested/file.txt", "..", "", "win\\path"] {
            let err = StagedConfig::stage(&files(&[(bad, "x")]), None).unwrap_err();
            assert!(err.is_validation_error(), "should reject {bad:?}");
        }
    }

    #[test]
    fn test_custom_parent_directory() {
        let parent = TempDir::new().unwrap();
        let staged =
            StagedConfig::stage(&files(&[("a.txt", "a")]), Some(parent.path())).unwrap();
        assert!(staged.scratch_dir().starts_with(parent.path()));
    }
}
