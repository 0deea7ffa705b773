//! # unarc archive
//!
//! Streaming archive handles for unarc.
//!
//! Every handle implements [`unarc_core::ArchiveHandle`] over a plain
//! [`std::io::Read`], so archives can be read from files, pipes or a chained
//! volume set without seeking:
//!
//! - **ZIP**: local headers walked front to back, Stored and Deflate
//! - **TAR**: UStar, PAX and GNU long names
//! - **TAR.GZ**: TAR inside a gzip stream
//!
//! RAR and 7-Zip signatures are recognized so they can be refused with a
//! precise error.
//!
//! ## Example
//!
//! ```rust,no_run
//! use unarc_archive::open_archive;
//! use std::fs::File;
//!
//! let file = File::open("archive.zip").unwrap();
//! let mut handle = open_archive(file).unwrap();
//! while let Some(entry) = handle.next_entry().unwrap() {
//!     println!("{}", entry);
//! }
//! handle.close().unwrap();
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod detect;
pub mod open;
mod stream;
pub mod tar;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod zip;

// Re-exports
pub use detect::ArchiveFormat;
pub use open::open_archive;
pub use tar::{TarHandle, TarHeader};
pub use zip::{LocalFileHeader, ZipHandle};
