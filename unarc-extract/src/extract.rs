//! Extraction orchestration.
//!
//! Every public entry point funnels into [`extract_archive_to`], which owns
//! the policy: an encrypted archive is skipped as a whole, an encrypted entry
//! is skipped on its own, and the first failure stops the run. Whatever the
//! outcome, an opened handle is closed exactly once.

use crate::guard::HandleGuard;
use crate::options::ExtractOptions;
use crate::validate;
use std::io::Read;
use std::path::Path;
use tracing::{error, info, warn};
use unarc_archive::open_archive;
use unarc_core::error::Result;
use unarc_core::{
    ArchiveHandle, EntryDescriptor, ExtractDestination, FileVolumeManager, VolumeManager,
};

/// Extract the archive at `source` into the directory `destination`.
///
/// String form of [`extract_file`]. Empty arguments are rejected before
/// anything else is checked.
pub fn extract_paths(source: &str, destination: &str) -> Result<()> {
    validate::require_arguments(source, destination)?;
    extract_file(Path::new(source), Path::new(destination))
}

/// Extract the archive file `source` into the existing directory `destination`.
///
/// # Errors
///
/// A configuration error if `source` is not a file or `destination` is not a
/// directory; in that case the archive is never opened. Otherwise any archive
/// or I/O error raised while reading or writing.
pub fn extract_file(source: &Path, destination: &Path) -> Result<()> {
    extract_file_with(source, destination, &ExtractOptions::default())
}

/// [`extract_file`] with explicit options.
pub fn extract_file_with(
    source: &Path,
    destination: &Path,
    options: &ExtractOptions,
) -> Result<()> {
    validate::archive_path(source)?;
    validate::destination_dir(destination)?;

    let mut sink = options.local_folder(destination);
    extract_to(&mut sink, &FileVolumeManager::new(source))
}

/// Extract an archive read from `reader` into the existing directory `destination`.
///
/// Only the destination can be validated up front.
pub fn extract_stream(reader: impl Read + 'static, destination: &Path) -> Result<()> {
    extract_stream_with(reader, destination, &ExtractOptions::default())
}

/// [`extract_stream`] with explicit options.
pub fn extract_stream_with(
    reader: impl Read + 'static,
    destination: &Path,
    options: &ExtractOptions,
) -> Result<()> {
    validate::destination_dir(destination)?;

    let handle = open_archive(reader)
        .inspect_err(|e| error!(source = "stream", error = %e, "cannot open archive"))?;
    let mut sink = options.local_folder(destination);
    extract_archive_to(handle, &mut sink)
}

/// Extract the archive behind `volumes` into an arbitrary destination.
///
/// No validation is performed; the volume manager is trusted to know where
/// its bytes are.
pub fn extract_to(
    destination: &mut dyn ExtractDestination,
    volumes: &dyn VolumeManager,
) -> Result<()> {
    let handle = open_volumes(volumes)?;
    extract_archive_to(handle, destination)
}

pub(crate) fn open_volumes(volumes: &dyn VolumeManager) -> Result<Box<dyn ArchiveHandle>> {
    volumes
        .open_volumes()
        .and_then(open_archive)
        .inspect_err(|e| error!(source = %volumes.location(), error = %e, "cannot open archive"))
}

/// Drive an opened handle into `destination`.
///
/// The handle is closed before this returns, whether extraction succeeded,
/// was skipped or failed.
pub fn extract_archive_to(
    handle: Box<dyn ArchiveHandle>,
    destination: &mut dyn ExtractDestination,
) -> Result<()> {
    let mut guard = HandleGuard::new(handle);
    let archive = guard.handle();

    if archive.is_encrypted() {
        warn!(format = archive.format_name(), "archive is encrypted, cannot extract");
        return guard.release();
    }

    while let Some(entry) = archive
        .next_entry()
        .inspect_err(|e| error!(error = %e, "error reading archive"))?
    {
        extract_entry(archive, destination, &entry)
            .inspect_err(|e| error!(entry = %entry.name, error = %e, "error extracting entry"))?;
    }

    guard.release()
}

fn extract_entry(
    archive: &mut dyn ArchiveHandle,
    destination: &mut dyn ExtractDestination,
    entry: &EntryDescriptor,
) -> Result<()> {
    if entry.is_encrypted {
        warn!(entry = %entry.name, "entry is encrypted, cannot extract");
        return Ok(());
    }

    info!(entry = %entry.name, "extracting");
    if entry.is_directory {
        destination.create_directory(entry)
    } else {
        destination.extract_file(archive, entry)
    }
}
