// src/store/file.rs

//! Atomic file replacement
//!
//! Content is written to a temporary file in the destination directory and
//! renamed over the target, so readers see either the old or the new file.

use crate::error::{Error, Result};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Replace `path` with `content`
pub fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    fs::create_dir_all(parent).map_err(|e| {
        Error::IoError(format!("Failed to create directory {}: {e}", parent.display()))
    })?;

    let mut temp = NamedTempFile::new_in(parent).map_err(|e| {
        Error::IoError(format!("Failed to create temp file in {}: {e}", parent.display()))
    })?;
    temp.write_all(content)
        .and_then(|_| temp.as_file().sync_all())
        .map_err(|e| Error::IoError(format!("Failed to write {}: {e}", path.display())))?;

    temp.persist(path).map_err(|e| {
        Error::IoError(format!("Failed to replace {}: {}", path.display(), e.error))
    })?;
    Ok(())
}

/// Read a file, `None` when it does not exist
pub fn read_optional(path: &Path) -> Result<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(Error::IoError(format!("Failed to read {}: {e}", path.display()))),
    }
}
