//! Extract command implementation.

use crate::utils::{EntryFilter, FilterDestination, ProgressDestination, create_spinner};
use std::io;
use std::path::{Path, PathBuf};
use unarc_archive::open_archive;
use unarc_core::{ExtractDestination, FileVolumeManager, SplitVolumeManager, VolumeManager};
use unarc_extract::{ExtractOptions, extract_archive_to, extract_to, validate};

/// Arguments of the extract command.
pub struct ExtractArgs<'a> {
    /// Archive path, or `-` for standard input.
    pub archive: &'a Path,
    pub output: &'a Path,
    pub overwrite: bool,
    pub preserve_mtime: bool,
    pub progress: bool,
    pub verbose: bool,
    pub include: &'a [String],
    pub exclude: &'a [String],
    /// Further volumes following `archive`, in order.
    pub parts: &'a [PathBuf],
    /// Discover numbered volumes next to `archive`.
    pub split: bool,
}

impl ExtractArgs<'_> {
    fn reads_stdin(&self) -> bool {
        self.archive == Path::new("-")
    }

    fn volumes(&self) -> Result<Box<dyn VolumeManager>, Box<dyn std::error::Error>> {
        if self.split {
            return Ok(Box::new(SplitVolumeManager::discover(self.archive)?));
        }
        if !self.parts.is_empty() {
            let mut all = vec![self.archive.to_path_buf()];
            all.extend(self.parts.iter().cloned());
            return Ok(Box::new(SplitVolumeManager::new(all)?));
        }
        Ok(Box::new(FileVolumeManager::new(self.archive)))
    }
}

pub fn cmd_extract(args: &ExtractArgs) -> Result<(), Box<dyn std::error::Error>> {
    validate::destination_dir(args.output)?;
    if !args.reads_stdin() {
        validate::archive_path(args.archive)?;
        for part in args.parts {
            validate::archive_path(part)?;
        }
    }

    let filter = EntryFilter::new(args.include, args.exclude)?;
    let options = ExtractOptions::new()
        .with_overwrite(args.overwrite)
        .with_preserve_mtime(args.preserve_mtime);

    let pb = create_spinner(args.progress);
    let mut sink = FilterDestination::new(
        ProgressDestination::new(options.local_folder(args.output), pb.clone(), args.verbose),
        filter,
    );

    let result = if args.reads_stdin() {
        open_archive(io::stdin()).and_then(|handle| extract_archive_to(handle, &mut sink))
    } else {
        let volumes = args.volumes()?;
        extract_to(&mut sink as &mut dyn ExtractDestination, volumes.as_ref())
    };

    match result {
        Ok(()) => {
            pb.finish_with_message("done");
            if args.verbose {
                println!("Extracted {} entries to {}", pb.position(), args.output.display());
            }
            Ok(())
        }
        Err(e) => {
            pb.abandon();
            Err(e.into())
        }
    }
}
