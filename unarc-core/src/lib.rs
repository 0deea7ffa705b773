//! # unarc core
//!
//! Core components for the unarc extraction library.
//!
//! - [`entry`]: entry descriptors and listing rows
//! - [`traits`]: the archive handle and extraction destination seams
//! - [`volume`]: on-disk byte sources, single file or split volume set
//! - [`error`]: error types
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ CLI                                                     │
//! │     list / extract / detect                             │
//! ├─────────────────────────────────────────────────────────┤
//! │ Orchestration (unarc-extract)                           │
//! │     validation, encryption skip policy, handle release  │
//! ├─────────────────────────────────────────────────────────┤
//! │ Container (unarc-archive)                               │
//! │     ZIP, TAR streaming handles, format detection        │
//! ├─────────────────────────────────────────────────────────┤
//! │ Core (this crate)                                       │
//! │     EntryDescriptor, ArchiveHandle, ExtractDestination  │
//! └─────────────────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod entry;
pub mod error;
pub mod traits;
pub mod volume;

// Re-exports for convenience
pub use entry::{ContentDescription, EntryDescriptor};
pub use error::{Result, UnarcError};
pub use traits::{ArchiveHandle, ExtractDestination};
pub use volume::{FileVolumeManager, SplitVolumeManager, VolumeManager};
