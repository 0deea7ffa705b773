//! Byte sources for archives stored on disk.
//!
//! A [`VolumeManager`] knows where an archive's bytes live and opens them as
//! a single forward stream. Split archives (`name.001`, `name.002`, ...) are
//! presented as their parts read back to back; no format-level spanning is
//! performed here.

use crate::error::{Result, UnarcError};
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

/// Supplies the byte stream of an archive.
pub trait VolumeManager {
    /// Open all volumes as one stream, positioned at the first byte.
    fn open_volumes(&self) -> Result<Box<dyn Read>>;

    /// Human-readable location, used in log messages.
    fn location(&self) -> String;
}

/// A single-file archive.
#[derive(Debug, Clone)]
pub struct FileVolumeManager {
    path: PathBuf,
}

impl FileVolumeManager {
    /// Create a manager for the archive at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the archive file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl VolumeManager for FileVolumeManager {
    fn open_volumes(&self) -> Result<Box<dyn Read>> {
        let file = File::open(&self.path)?;
        Ok(Box::new(BufReader::new(file)))
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// An archive split into numbered parts.
#[derive(Debug, Clone)]
pub struct SplitVolumeManager {
    parts: Vec<PathBuf>,
}

impl SplitVolumeManager {
    /// Create a manager over explicitly ordered parts.
    pub fn new(parts: Vec<PathBuf>) -> Result<Self> {
        if parts.is_empty() {
            return Err(UnarcError::configuration(
                "a volume set needs at least one part",
            ));
        }
        Ok(Self { parts })
    }

    /// Discover the parts of a numbered volume set from its first part.
    ///
    /// `first` must end in a purely numeric extension (`.001`, `.01`, ...).
    /// Following parts keep the same width and are collected until the first
    /// gap.
    pub fn discover(first: &Path) -> Result<Self> {
        let file_name = first
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                UnarcError::configuration(format!("invalid volume path: {}", first.display()))
            })?;

        let (stem, number) = file_name
            .rsplit_once('.')
            .filter(|(_, ext)| !ext.is_empty() && ext.bytes().all(|b| b.is_ascii_digit()))
            .ok_or_else(|| {
                UnarcError::configuration(format!(
                    "first volume must have a numeric extension: {}",
                    first.display()
                ))
            })?;

        let width = number.len();
        let start: u32 = number.parse().map_err(|_| {
            UnarcError::configuration(format!("volume number out of range: {}", number))
        })?;

        let mut parts = vec![first.to_path_buf()];
        let mut next = start.checked_add(1);
        while let Some(number) = next {
            let candidate = first.with_file_name(format!("{}.{:0width$}", stem, number));
            if !candidate.is_file() {
                break;
            }
            parts.push(candidate);
            next = number.checked_add(1);
        }

        Ok(Self { parts })
    }

    /// Paths of all parts, in read order.
    pub fn parts(&self) -> &[PathBuf] {
        &self.parts
    }
}

impl VolumeManager for SplitVolumeManager {
    fn open_volumes(&self) -> Result<Box<dyn Read>> {
        // Open every part up front so a missing volume fails before parsing.
        let mut stream: Box<dyn Read> = Box::new(io::empty());
        for part in &self.parts {
            let file = File::open(part)?;
            stream = Box::new(stream.chain(BufReader::new(file)));
        }
        Ok(stream)
    }

    fn location(&self) -> String {
        match self.parts.as_slice() {
            [only] => only.display().to_string(),
            [first, ..] => format!("{} (+{} parts)", first.display(), self.parts.len() - 1),
            [] => String::new(),
        }
    }
}
