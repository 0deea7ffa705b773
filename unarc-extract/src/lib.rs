//! # unarc extract
//!
//! Extraction and listing orchestration for unarc.
//!
//! The functions here sit between an [`ArchiveHandle`](unarc_core::ArchiveHandle)
//! and an [`ExtractDestination`](unarc_core::ExtractDestination):
//!
//! - paths are validated before an archive is opened
//! - an archive-level encrypted archive is skipped with a warning
//! - encrypted entries are skipped one by one while their siblings extract
//! - the first error aborts the run and is returned to the caller
//! - an opened handle is closed exactly once, on every path
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! unarc_extract::extract_file(Path::new("backup.tar.gz"), Path::new("restore")).unwrap();
//!
//! for row in unarc_extract::list_contents(Path::new("backup.tar.gz")).unwrap() {
//!     println!("{:>12} {}", row.size, row.name);
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod destination;
pub mod extract;
mod guard;
pub mod list;
pub mod options;
pub mod validate;

// Re-exports
pub use destination::LocalFolderExtractor;
pub use extract::{
    extract_archive_to, extract_file, extract_file_with, extract_paths, extract_stream,
    extract_stream_with, extract_to,
};
pub use list::{list_archive, list_contents, list_entries};
pub use options::ExtractOptions;
