//! Listing orchestration.
//!
//! Listing follows the same open and close discipline as extraction but
//! never touches entry data. Encrypted entries are listed like any other;
//! only an archive-level encrypted archive yields nothing.

use crate::extract::open_volumes;
use crate::guard::HandleGuard;
use crate::validate;
use std::path::Path;
use tracing::{error, warn};
use unarc_core::error::Result;
use unarc_core::{ArchiveHandle, ContentDescription, EntryDescriptor, FileVolumeManager};

/// List the entries of the archive file `source` as `(name, size)` rows.
///
/// # Errors
///
/// A configuration error if `source` is not a file, otherwise any archive
/// or I/O error raised while walking the headers.
pub fn list_contents(source: &Path) -> Result<Vec<ContentDescription>> {
    validate::archive_path(source)?;
    let handle = open_volumes(&FileVolumeManager::new(source))?;
    list_archive(handle)
}

/// Collect `(name, size)` rows from an opened handle, then close it.
pub fn list_archive(handle: Box<dyn ArchiveHandle>) -> Result<Vec<ContentDescription>> {
    Ok(list_entries(handle)?
        .iter()
        .map(EntryDescriptor::describe)
        .collect())
}

/// Collect full entry descriptors from an opened handle, then close it.
pub fn list_entries(handle: Box<dyn ArchiveHandle>) -> Result<Vec<EntryDescriptor>> {
    let mut guard = HandleGuard::new(handle);
    let archive = guard.handle();

    if archive.is_encrypted() {
        warn!(format = archive.format_name(), "archive is encrypted, cannot list");
        guard.release()?;
        return Ok(Vec::new());
    }

    let mut entries = Vec::new();
    while let Some(entry) = archive
        .next_entry()
        .inspect_err(|e| error!(error = %e, "error reading archive"))?
    {
        entries.push(entry);
    }

    guard.release()?;
    Ok(entries)
}
