//! Extraction options.

use crate::destination::LocalFolderExtractor;
use std::path::PathBuf;

/// How entries are written to a directory tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Replace files that already exist.
    pub overwrite: bool,
    /// Apply the entry's modification time to written files and directories.
    pub preserve_mtime: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            overwrite: true,
            preserve_mtime: true,
        }
    }
}

impl ExtractOptions {
    /// Create options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether existing files are replaced.
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Set whether modification times are restored.
    pub fn with_preserve_mtime(mut self, preserve: bool) -> Self {
        self.preserve_mtime = preserve;
        self
    }

    /// Build a directory-tree destination rooted at `root`.
    pub fn local_folder(&self, root: impl Into<PathBuf>) -> LocalFolderExtractor {
        LocalFolderExtractor::new(root)
            .overwrite(self.overwrite)
            .preserve_mtime(self.preserve_mtime)
    }
}
