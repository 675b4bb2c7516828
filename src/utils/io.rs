//! File I/O primitives with consistent error handling.

use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Read file contents with standardized error handling.
///
/// Non-UTF-8 files surface as `internal.io_error` like any other read failure.
pub fn read_file(path: &Path, operation: &str) -> Result<String> {
    fs::read_to_string(path)
        .map_err(|e| Error::internal_io(e.to_string(), Some(operation.to_string())))
}

/// Write content to file with standardized error handling.
pub fn write_file(path: &Path, content: &str, operation: &str) -> Result<()> {
    fs::write(path, content)
        .map_err(|e| Error::internal_io(e.to_string(), Some(operation.to_string())))
}

/// Path of the backup copy for `path`: the file name with `suffix` appended.
pub fn backup_path(path: &Path, suffix: &str) -> Result<PathBuf> {
    let filename = path.file_name().ok_or_else(|| {
        Error::internal_io(
            format!("Invalid path: {}", path.display()),
            Some("backup path".to_string()),
        )
    })?;

    Ok(path.with_file_name(format!("{}{}", filename.to_string_lossy(), suffix)))
}

/// Copy `path` next to itself under [`backup_path`] and return the copy's path.
pub fn backup_file(path: &Path, suffix: &str) -> Result<PathBuf> {
    let target = backup_path(path, suffix)?;
    fs::copy(path, &target).map_err(|e| {
        Error::internal_io(e.to_string(), Some(format!("backup {}", path.display())))
    })?;
    Ok(target)
}
