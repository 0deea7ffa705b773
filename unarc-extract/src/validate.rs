//! Precondition checks run before any archive is opened.
//!
//! These only look at existence and file type. Nothing is read.

use std::path::Path;
use unarc_core::error::{Result, UnarcError};

/// Both string arguments must be non-empty.
pub fn require_arguments(source: &str, destination: &str) -> Result<()> {
    if source.is_empty() || destination.is_empty() {
        return Err(UnarcError::configuration(
            "archive and destination must be set",
        ));
    }
    Ok(())
}

/// The archive must exist and be a regular file.
pub fn archive_path(path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() {
        return Err(UnarcError::configuration("archive must be set"));
    }
    if !path.exists() {
        return Err(UnarcError::configuration(format!(
            "the archive does not exist: {}",
            path.display()
        )));
    }
    if !path.is_file() {
        return Err(UnarcError::configuration(format!(
            "the archive must be a file but was {}",
            path.display()
        )));
    }
    Ok(())
}

/// The destination must exist and be a directory.
pub fn destination_dir(path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() {
        return Err(UnarcError::configuration("destination must be set"));
    }
    if !path.is_dir() {
        return Err(UnarcError::configuration(format!(
            "the destination must exist and point to a directory: {}",
            path.display()
        )));
    }
    Ok(())
}
