//! Directory-tree destination.

use filetime::FileTime;
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;
use unarc_core::error::{Result, UnarcError};
use unarc_core::{ArchiveHandle, EntryDescriptor, ExtractDestination};

/// Writes entries below a root directory.
///
/// Entry names are treated as relative paths. Backslashes count as
/// separators, and names that would land outside the root are refused with
/// [`UnarcError::PathTraversal`].
#[derive(Debug, Clone)]
pub struct LocalFolderExtractor {
    root: PathBuf,
    overwrite: bool,
    preserve_mtime: bool,
}

impl LocalFolderExtractor {
    /// Create a destination rooted at `root`, which should already exist.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            overwrite: true,
            preserve_mtime: true,
        }
    }

    /// Replace existing files (default), or fail with `AlreadyExists`.
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Restore entry modification times (default).
    pub fn preserve_mtime(mut self, preserve: bool) -> Self {
        self.preserve_mtime = preserve;
        self
    }

    /// Map an entry name to a path below the root.
    pub fn resolve(&self, name: &str) -> Result<PathBuf> {
        let normalized = name.replace('\\', "/");
        if normalized.starts_with('/') {
            return Err(UnarcError::path_traversal(name));
        }

        let mut path = self.root.clone();
        for (i, component) in normalized.split('/').enumerate() {
            match component {
                "" | "." => continue,
                ".." => return Err(UnarcError::path_traversal(name)),
                drive if i == 0 && is_drive_prefix(drive) => {
                    return Err(UnarcError::path_traversal(name));
                }
                part => path.push(part),
            }
        }
        Ok(path)
    }

    fn apply_mtime(&self, path: &Path, entry: &EntryDescriptor) -> Result<()> {
        if let (true, Some(modified)) = (self.preserve_mtime, entry.modified) {
            filetime::set_file_mtime(path, FileTime::from_system_time(modified))?;
        }
        Ok(())
    }

    #[cfg(unix)]
    fn apply_mode(path: &Path, entry: &EntryDescriptor) -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        if let Some(mode) = entry.unix_mode {
            fs::set_permissions(path, fs::Permissions::from_mode(mode))?;
        }
        Ok(())
    }

    #[cfg(not(unix))]
    fn apply_mode(_path: &Path, _entry: &EntryDescriptor) -> Result<()> {
        Ok(())
    }
}

/// `C:` and the like.
fn is_drive_prefix(component: &str) -> bool {
    let bytes = component.as_bytes();
    bytes.len() == 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

impl ExtractDestination for LocalFolderExtractor {
    fn create_directory(&mut self, entry: &EntryDescriptor) -> Result<()> {
        let path = self.resolve(&entry.name)?;
        fs::create_dir_all(&path)?;
        self.apply_mtime(&path, entry)?;
        debug!(path = %path.display(), "created directory");
        Ok(())
    }

    fn extract_file(
        &mut self,
        archive: &mut dyn ArchiveHandle,
        entry: &EntryDescriptor,
    ) -> Result<()> {
        let path = self.resolve(&entry.name)?;
        if path == self.root {
            return Err(UnarcError::invalid_header(format!(
                "file entry has no usable name: {:?}",
                entry.name
            )));
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut file = if self.overwrite {
            OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&path)?
        } else {
            OpenOptions::new().write(true).create_new(true).open(&path)?
        };

        let mut reader = archive.entry_reader()?;
        let written = io::copy(&mut reader, &mut file)?;
        drop(file);

        self.apply_mtime(&path, entry)?;
        Self::apply_mode(&path, entry)?;
        debug!(path = %path.display(), bytes = written, "wrote file");
        Ok(())
    }
}
