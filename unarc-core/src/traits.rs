//! Core traits for archive extraction.
//!
//! [`ArchiveHandle`] is the seam to a format parser: a forward-only cursor
//! over entry headers plus access to the current entry's bytes.
//! [`ExtractDestination`] is the seam to whatever turns entries into effects.

use crate::entry::EntryDescriptor;
use crate::error::Result;
use std::io::Read;

/// An open, stateful cursor over an archive.
///
/// Entries are produced lazily in the archive's native order. The cursor is
/// single-pass: once [`next_entry`](Self::next_entry) moves on, the previous
/// entry's bytes are gone, and there is no way to restart.
pub trait ArchiveHandle {
    /// Short name of the container format ("ZIP", "TAR", ...).
    fn format_name(&self) -> &str;

    /// Whether the archive as a whole is encrypted (e.g. encrypted headers).
    fn is_encrypted(&self) -> bool;

    /// Advance to the next entry.
    ///
    /// Returns `Ok(None)` once the archive is exhausted. Any unread data of the
    /// previous entry is skipped.
    fn next_entry(&mut self) -> Result<Option<EntryDescriptor>>;

    /// Open a reader over the decoded bytes of the current entry.
    ///
    /// Only valid for file entries, after `next_entry` returned `Some`. The
    /// reader yields exactly the entry's uncompressed bytes and verifies
    /// integrity at end of stream where the format allows it.
    fn entry_reader(&mut self) -> Result<Box<dyn Read + '_>>;

    /// Release the underlying byte source.
    ///
    /// Calling `close` more than once is harmless. After the first call every
    /// other method fails with [`UnarcError::Closed`](crate::UnarcError::Closed).
    fn close(&mut self) -> Result<()>;
}

impl<H: ArchiveHandle + ?Sized> ArchiveHandle for Box<H> {
    fn format_name(&self) -> &str {
        (**self).format_name()
    }

    fn is_encrypted(&self) -> bool {
        (**self).is_encrypted()
    }

    fn next_entry(&mut self) -> Result<Option<EntryDescriptor>> {
        (**self).next_entry()
    }

    fn entry_reader(&mut self) -> Result<Box<dyn Read + '_>> {
        (**self).entry_reader()
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }
}

/// A destination that materializes archive entries.
///
/// A directory tree on disk is one implementation. In-memory collectors,
/// filters and progress decorators are others.
pub trait ExtractDestination {
    /// Materialize a directory entry.
    fn create_directory(&mut self, entry: &EntryDescriptor) -> Result<()>;

    /// Materialize a file entry, reading its bytes from `archive`.
    ///
    /// `archive` is positioned at `entry`; implementations obtain the data
    /// through [`ArchiveHandle::entry_reader`].
    fn extract_file(
        &mut self,
        archive: &mut dyn ArchiveHandle,
        entry: &EntryDescriptor,
    ) -> Result<()>;
}

impl<D: ExtractDestination + ?Sized> ExtractDestination for &mut D {
    fn create_directory(&mut self, entry: &EntryDescriptor) -> Result<()> {
        (**self).create_directory(entry)
    }

    fn extract_file(
        &mut self,
        archive: &mut dyn ArchiveHandle,
        entry: &EntryDescriptor,
    ) -> Result<()> {
        (**self).extract_file(archive, entry)
    }
}
