//! List command implementation.

use crate::utils::{EntryFilter, print_entries};
use serde::Serialize;
use std::path::Path;
use unarc_archive::open_archive;
use unarc_core::{ContentDescription, EntryDescriptor, FileVolumeManager, VolumeManager};
use unarc_extract::{list_entries, validate};

/// JSON serializable entry data for archive listings.
#[derive(Debug, Serialize)]
struct EntryJson {
    #[serde(flatten)]
    content: ContentDescription,
    is_dir: bool,
    encrypted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    mtime: Option<i64>,
}

impl EntryJson {
    fn from_entry(entry: &EntryDescriptor) -> Self {
        let mtime = entry.modified.and_then(|t| {
            t.duration_since(std::time::UNIX_EPOCH)
                .ok()
                .map(|d| d.as_secs() as i64)
        });

        Self {
            content: entry.describe(),
            is_dir: entry.is_directory,
            encrypted: entry.is_encrypted,
            mtime,
        }
    }
}

/// JSON output for archive listing.
#[derive(Debug, Serialize)]
struct ArchiveListJson {
    archive: String,
    format: String,
    entries: Vec<EntryJson>,
}

/// Options for listing archive contents.
pub struct ListOptions<'a> {
    pub verbose: bool,
    pub json: bool,
    pub include: &'a [String],
    pub exclude: &'a [String],
}

pub fn cmd_list(archive: &Path, options: &ListOptions) -> Result<(), Box<dyn std::error::Error>> {
    validate::archive_path(archive)?;
    let filter = EntryFilter::new(options.include, options.exclude)?;

    let handle = open_archive(FileVolumeManager::new(archive).open_volumes()?)?;
    let format = handle.format_name().to_string();
    let entries: Vec<EntryDescriptor> = list_entries(handle)?
        .into_iter()
        .filter(|e| filter.matches(&e.name))
        .collect();

    if options.json {
        let listing = ArchiveListJson {
            archive: archive.display().to_string(),
            format,
            entries: entries.iter().map(EntryJson::from_entry).collect(),
        };
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }

    println!("Archive: {} ({})", archive.display(), format);
    println!();
    print_entries(&entries, options.verbose);

    Ok(())
}
