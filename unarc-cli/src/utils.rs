//! Utility functions and destination decorators for the CLI.

use glob::Pattern;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use unarc_core::error::{Result, UnarcError};
use unarc_core::{ArchiveHandle, EntryDescriptor, ExtractDestination};

/// Create a spinner that counts processed entries.
///
/// Entry counts are unknown until a streaming archive has been read to the
/// end, so there is no bar to fill.
pub fn create_spinner(enable: bool) -> ProgressBar {
    if !enable {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new_spinner();
    let template = "{spinner:.cyan} [{elapsed_precise}] {pos} entries {wide_msg}";
    if let Ok(style) = ProgressStyle::with_template(template) {
        pb.set_style(style);
    }
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Compile glob patterns, failing on the first invalid one.
pub fn compile_patterns(patterns: &[String]) -> Result<Vec<Pattern>> {
    patterns
        .iter()
        .map(|p| {
            Pattern::new(p).map_err(|e| {
                UnarcError::configuration(format!("invalid pattern '{}': {}", p, e))
            })
        })
        .collect()
}

/// Include/exclude filter over entry names.
/// - If include patterns are specified, the name must match at least one
/// - If exclude patterns are specified, the name must not match any
#[derive(Debug, Clone, Default)]
pub struct EntryFilter {
    include: Vec<Pattern>,
    exclude: Vec<Pattern>,
}

impl EntryFilter {
    pub fn new(include: &[String], exclude: &[String]) -> Result<Self> {
        Ok(Self {
            include: compile_patterns(include)?,
            exclude: compile_patterns(exclude)?,
        })
    }

    pub fn matches(&self, name: &str) -> bool {
        // Directory entries carry a trailing slash that patterns rarely spell out
        let name = name.trim_end_matches('/');
        if self.exclude.iter().any(|p| p.matches(name)) {
            return false;
        }
        self.include.is_empty() || self.include.iter().any(|p| p.matches(name))
    }
}

/// Passes only matching entries on to the inner destination.
pub struct FilterDestination<D> {
    inner: D,
    filter: EntryFilter,
}

impl<D: ExtractDestination> FilterDestination<D> {
    pub fn new(inner: D, filter: EntryFilter) -> Self {
        Self { inner, filter }
    }
}

impl<D: ExtractDestination> ExtractDestination for FilterDestination<D> {
    fn create_directory(&mut self, entry: &EntryDescriptor) -> Result<()> {
        if !self.filter.matches(&entry.name) {
            return Ok(());
        }
        self.inner.create_directory(entry)
    }

    fn extract_file(
        &mut self,
        archive: &mut dyn ArchiveHandle,
        entry: &EntryDescriptor,
    ) -> Result<()> {
        if !self.filter.matches(&entry.name) {
            tracing::debug!(entry = %entry.name, "filtered out");
            return Ok(());
        }
        self.inner.extract_file(archive, entry)
    }
}

/// Ticks a progress bar for every entry the inner destination handles.
pub struct ProgressDestination<D> {
    inner: D,
    pb: ProgressBar,
    verbose: bool,
}

impl<D: ExtractDestination> ProgressDestination<D> {
    pub fn new(inner: D, pb: ProgressBar, verbose: bool) -> Self {
        Self { inner, pb, verbose }
    }

    fn finish_entry(&self, label: &str, entry: &EntryDescriptor) {
        self.pb.inc(1);
        if !self.verbose {
            return;
        }
        let line = format!("  {}: {} ({} bytes)", label, entry.name, entry.size);
        // A hidden bar swallows println
        if self.pb.is_hidden() {
            println!("{}", line);
        } else {
            self.pb.println(line);
        }
    }
}

impl<D: ExtractDestination> ExtractDestination for ProgressDestination<D> {
    fn create_directory(&mut self, entry: &EntryDescriptor) -> Result<()> {
        self.pb.set_message(entry.name.clone());
        self.inner.create_directory(entry)?;
        self.finish_entry("Created", entry);
        Ok(())
    }

    fn extract_file(
        &mut self,
        archive: &mut dyn ArchiveHandle,
        entry: &EntryDescriptor,
    ) -> Result<()> {
        self.pb.set_message(entry.name.clone());
        self.inner.extract_file(archive, entry)?;
        self.finish_entry("Extracted", entry);
        Ok(())
    }
}

/// Print entries, names only or as a table.
pub fn print_entries(entries: &[EntryDescriptor], verbose: bool) {
    if !verbose {
        for entry in entries {
            println!("{}", entry.name);
        }
        return;
    }

    println!("{:>2}{:>12} Name", "", "Size");
    println!("{}", "-".repeat(60));

    let mut total_size = 0u64;
    let mut files = 0usize;
    let mut encrypted = 0usize;
    for entry in entries {
        println!("{}", entry);
        total_size += entry.size;
        files += usize::from(entry.is_file());
        encrypted += usize::from(entry.is_encrypted);
    }

    println!("{}", "-".repeat(60));
    println!(
        "{:>2}{:>12} {} files, {} directories, {} encrypted",
        "",
        total_size,
        files,
        entries.len() - files,
        encrypted
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use unarc_archive::ZipHandle;
    use unarc_archive::testing::ZipBuilder;

    #[derive(Default)]
    struct Names(Vec<String>);

    impl ExtractDestination for Names {
        fn create_directory(&mut self, entry: &EntryDescriptor) -> Result<()> {
            self.0.push(entry.name.clone());
            Ok(())
        }

        fn extract_file(
            &mut self,
            _archive: &mut dyn ArchiveHandle,
            entry: &EntryDescriptor,
        ) -> Result<()> {
            self.0.push(entry.name.clone());
            Ok(())
        }
    }

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_filter_matches() {
        let include = strings(&["*.txt", "src/**/*"]);
        let filter = EntryFilter::new(&include, &strings(&["secret*"])).unwrap();
        assert!(filter.matches("notes.txt"));
        assert!(filter.matches("src/lib/mod.rs"));
        assert!(!filter.matches("image.png"));
        assert!(!filter.matches("secret.txt"));

        let all = EntryFilter::default();
        assert!(all.matches("anything/at/all"));
        assert!(all.matches("dir/"));
    }

    #[test]
    fn test_invalid_pattern_is_configuration_error() {
        let err = EntryFilter::new(&strings(&["[unclosed"]), &[]).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_decorators_forward_matching_entries() {
        let bytes = ZipBuilder::new()
            .directory("keep")
            .stored("keep/a.txt", b"a")
            .stored("drop.bin", b"b")
            .finish();
        let mut handle = ZipHandle::new(Cursor::new(bytes));

        let filter = EntryFilter::new(&strings(&["keep*"]), &[]).unwrap();
        let pb = ProgressBar::hidden();
        let mut sink = FilterDestination::new(
            ProgressDestination::new(Names::default(), pb.clone(), false),
            filter,
        );

        while let Some(entry) = handle.next_entry().unwrap() {
            if entry.is_directory {
                sink.create_directory(&entry).unwrap();
            } else {
                sink.extract_file(&mut handle, &entry).unwrap();
            }
        }

        assert_eq!(sink.inner.inner.0, strings(&["keep/", "keep/a.txt"]));
        // Filtered entries are not counted
        assert_eq!(pb.position(), 2);
    }
}
