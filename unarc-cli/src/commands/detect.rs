//! Detect command implementation.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use unarc_archive::{ArchiveFormat, open_archive};

pub fn cmd_detect(file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let f = File::open(file)?;
    let (format, stream) = ArchiveFormat::sniff(BufReader::new(f))?;
    let magic = stream.get_ref().0.get_ref();
    let magic = magic[..magic.len().min(16)].to_vec();

    println!("File: {}", file.display());
    println!("Format: {}", format);
    if !format.extension().is_empty() {
        println!("Extension: .{}", format.extension());
    }
    println!("Magic bytes: {:02X?}", magic);

    // Gzip only says something about the wrapper; opening looks inside.
    match open_archive(stream) {
        Ok(mut handle) => {
            println!("Readable: yes ({})", handle.format_name());
            handle.close()?;
        }
        Err(e) => println!("Readable: no ({})", e),
    }

    Ok(())
}
