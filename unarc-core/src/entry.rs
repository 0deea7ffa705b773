//! Archive entry metadata.
//!
//! An [`EntryDescriptor`] is the value a parser hands out each time its
//! cursor advances. A [`ContentDescription`] is the reduced `(name, size)`
//! view that listing collects.

use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// Metadata for one archive member.
///
/// Descriptors are snapshots. They stay valid after the handle advances, but
/// the bytes they describe can only be read while the entry is current.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryDescriptor {
    /// The name/path of the entry within the archive.
    pub name: String,
    /// Uncompressed size in bytes.
    pub size: u64,
    /// Whether the entry is a directory marker.
    pub is_directory: bool,
    /// Whether this entry's data is encrypted.
    pub is_encrypted: bool,
    /// Last modification time.
    pub modified: Option<SystemTime>,
    /// Unix mode bits (rwxrwxrwx), when the format records them.
    pub unix_mode: Option<u32>,
}

impl EntryDescriptor {
    /// Create a new file entry.
    pub fn file(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
            is_directory: false,
            is_encrypted: false,
            modified: None,
            unix_mode: None,
        }
    }

    /// Create a new directory entry.
    pub fn directory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size: 0,
            is_directory: true,
            is_encrypted: false,
            modified: None,
            unix_mode: None,
        }
    }

    /// Builder method to mark the entry as encrypted.
    pub fn with_encrypted(mut self, encrypted: bool) -> Self {
        self.is_encrypted = encrypted;
        self
    }

    /// Builder method to set modification time.
    pub fn with_modified(mut self, time: SystemTime) -> Self {
        self.modified = Some(time);
        self
    }

    /// Builder method to set Unix mode.
    pub fn with_mode(mut self, mode: u32) -> Self {
        self.unix_mode = Some(mode);
        self
    }

    /// Check if this is a file.
    pub fn is_file(&self) -> bool {
        !self.is_directory
    }

    /// Reduce this descriptor to its listing view.
    pub fn describe(&self) -> ContentDescription {
        ContentDescription {
            name: self.name.clone(),
            size: self.size,
        }
    }
}

impl std::fmt::Display for EntryDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let type_char = if self.is_directory { 'd' } else { '-' };
        let lock = if self.is_encrypted { '*' } else { ' ' };
        write!(f, "{}{}{:>12} {}", type_char, lock, self.size, self.name)
    }
}

/// One row of a content listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentDescription {
    /// Entry name as stored in the archive.
    pub name: String,
    /// Uncompressed size in bytes.
    pub size: u64,
}

impl ContentDescription {
    /// Create a new listing row.
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
        }
    }
}
