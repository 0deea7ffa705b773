//! TAR archive format support.
//!
//! This module provides forward-only reading of TAR archives with support for:
//! - UStar format (POSIX.1-1988)
//! - PAX extended headers (POSIX.1-2001) for long filenames and large sizes
//! - GNU long name and long link headers
//!
//! Only regular files and directories become entries. Links, devices and
//! FIFOs are stepped over.

use crate::stream::{self, Bounded};
use std::collections::HashMap;
use std::io::{self, BufReader, Read};
use std::time::{Duration, UNIX_EPOCH};
use tracing::{debug, trace};
use unarc_core::error::{Result, UnarcError};
use unarc_core::{ArchiveHandle, EntryDescriptor};

/// TAR block size.
pub const BLOCK_SIZE: usize = 512;

/// PAX typeflag for extended header (applies to next file only).
const PAX_HEADER: u8 = b'x';

/// PAX typeflag for global extended header (applies to all subsequent files).
const PAX_GLOBAL_HEADER: u8 = b'g';

/// GNU LongName typeflag.
const GNU_LONGNAME: u8 = b'L';

/// GNU LongLink typeflag.
const GNU_LONGLINK: u8 = b'K';

/// Largest extension header we are willing to buffer.
const MAX_EXTENSION_SIZE: u64 = 1 << 20;

/// TAR header.
#[derive(Debug, Clone)]
pub struct TarHeader {
    /// File name, prefix already joined.
    pub name: String,
    /// File mode.
    pub mode: u32,
    /// File size.
    pub size: u64,
    /// Modification time.
    pub mtime: u64,
    /// Type flag.
    pub typeflag: u8,
    /// Link name.
    pub linkname: String,
}

/// What a header describes, as far as extraction is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TarEntryKind {
    /// Regular or contiguous file.
    File,
    /// Directory.
    Directory,
    /// Anything else (links, devices, FIFOs, vendor types).
    Other,
}

impl TarHeader {
    /// Read a TAR header from a block.
    ///
    /// Returns `None` for an all-zero block, which marks the end of the archive.
    pub fn from_block(block: &[u8; BLOCK_SIZE]) -> Result<Option<Self>> {
        if block.iter().all(|&b| b == 0) {
            return Ok(None);
        }

        Self::verify_checksum(block)?;

        let name = Self::parse_string(&block[0..100]);
        let mode = Self::parse_numeric(&block[100..108])? as u32;
        let size = Self::parse_numeric(&block[124..136])?;
        let mtime = Self::parse_numeric(&block[136..148])?;
        let typeflag = block[156];
        let linkname = Self::parse_string(&block[157..257]);

        let prefix = if &block[257..262] == b"ustar" {
            Self::parse_string(&block[345..500])
        } else {
            String::new()
        };

        let name = if prefix.is_empty() {
            name
        } else {
            format!("{}/{}", prefix, name)
        };

        Ok(Some(Self {
            name,
            mode,
            size,
            mtime,
            typeflag,
            linkname,
        }))
    }

    /// The checksum treats its own field as spaces. Old writers summed signed bytes.
    fn verify_checksum(block: &[u8; BLOCK_SIZE]) -> Result<()> {
        let stored = Self::parse_numeric(&block[148..156])?;

        let (mut unsigned, mut signed) = (0u64, 0i64);
        for (i, &b) in block.iter().enumerate() {
            let b = if (148..156).contains(&i) { b' ' } else { b };
            unsigned += b as u64;
            signed += b as i8 as i64;
        }

        if stored == unsigned || stored as i64 == signed {
            Ok(())
        } else {
            Err(UnarcError::invalid_header(format!(
                "TAR header checksum mismatch: stored {:o}, computed {:o}",
                stored, unsigned
            )))
        }
    }

    /// Parse a null-terminated string.
    fn parse_string(data: &[u8]) -> String {
        let end = data.iter().position(|&b| b == 0).unwrap_or(data.len());
        String::from_utf8_lossy(&data[..end]).into_owned()
    }

    /// Parse a numeric field: octal text, or GNU base-256 when the high bit is set.
    fn parse_numeric(data: &[u8]) -> Result<u64> {
        if data.first().is_some_and(|&b| b & 0x80 != 0) {
            let mut value = (data[0] & 0x7F) as u64;
            for &b in &data[1..] {
                if value >> 56 != 0 {
                    return Err(UnarcError::invalid_header("base-256 value overflows"));
                }
                value = (value << 8) | b as u64;
            }
            return Ok(value);
        }

        let s = Self::parse_string(data);
        let s = s.trim_matches(|c: char| c == ' ' || c == '\0');
        if s.is_empty() {
            return Ok(0);
        }
        u64::from_str_radix(s, 8)
            .map_err(|_| UnarcError::invalid_header(format!("Invalid octal: {}", s)))
    }

    /// Classify the header.
    pub fn kind(&self) -> TarEntryKind {
        match self.typeflag {
            b'5' => TarEntryKind::Directory,
            b'0' | 0 | b'7' if self.name.ends_with('/') => TarEntryKind::Directory,
            b'0' | 0 | b'7' => TarEntryKind::File,
            _ => TarEntryKind::Other,
        }
    }

    /// Whether the header carries metadata for the next header rather than an entry.
    fn is_extension(&self) -> bool {
        matches!(
            self.typeflag,
            PAX_HEADER | PAX_GLOBAL_HEADER | GNU_LONGNAME | GNU_LONGLINK
        )
    }

    /// Apply PAX extended attributes to this header.
    pub fn apply_pax_attrs(&mut self, attrs: &HashMap<String, String>) {
        if let Some(path) = attrs.get("path") {
            self.name = path.clone();
        }
        if let Some(linkpath) = attrs.get("linkpath") {
            self.linkname = linkpath.clone();
        }
        if let Some(size) = attrs.get("size").and_then(|s| s.parse::<u64>().ok()) {
            self.size = size;
        }
        if let Some(mtime) = attrs.get("mtime") {
            // PAX mtime can be fractional; keep whole seconds
            let whole = mtime.split('.').next().unwrap_or_default();
            if let Ok(t) = whole.parse::<u64>() {
                self.mtime = t;
            }
        }
    }

    /// Parse PAX extended header data.
    /// Format: "length key=value\n" repeated
    pub fn parse_pax_data(data: &[u8]) -> HashMap<String, String> {
        let mut attrs = HashMap::new();
        let mut pos = 0;

        while pos < data.len() {
            let Some(space_pos) = data[pos..].iter().position(|&b| b == b' ') else {
                break;
            };
            let space_pos = pos + space_pos;

            let len_str = String::from_utf8_lossy(&data[pos..space_pos]);
            let record_len: usize = match len_str.trim().parse() {
                Ok(l) => l,
                Err(_) => break,
            };
            if record_len == 0 || pos + record_len > data.len() || space_pos >= pos + record_len {
                break;
            }

            let record_end = pos + record_len;
            let mut value_end = record_end;
            if data.get(value_end - 1) == Some(&b'\n') {
                value_end -= 1;
            }
            let record = &data[space_pos + 1..value_end];

            if let Some(eq_pos) = record.iter().position(|&b| b == b'=') {
                let key = String::from_utf8_lossy(&record[..eq_pos]).into_owned();
                let value = String::from_utf8_lossy(&record[eq_pos + 1..]).into_owned();
                attrs.insert(key, value);
            }

            pos = record_end;
        }

        attrs
    }

    /// Convert to an entry descriptor.
    pub fn to_descriptor(&self) -> EntryDescriptor {
        let entry = match self.kind() {
            TarEntryKind::Directory => EntryDescriptor::directory(&self.name),
            _ => EntryDescriptor::file(&self.name, self.size),
        };
        entry
            .with_modified(UNIX_EPOCH + Duration::from_secs(self.mtime))
            .with_mode(self.mode & 0o7777)
    }
}

/// Zero bytes that follow `size` bytes of data up to the next block boundary.
fn padding_for(size: u64) -> u64 {
    let block = BLOCK_SIZE as u64;
    (block - size % block) % block
}

/// Entry size plus block padding, rejecting sizes no stream can hold.
fn padded_len(size: u64) -> Result<u64> {
    size.checked_add(padding_for(size)).ok_or_else(|| {
        UnarcError::invalid_header(format!("TAR entry size {} is out of range", size))
    })
}

/// Forward-only TAR reader implementing [`ArchiveHandle`].
pub struct TarHandle<R: Read> {
    reader: Option<BufReader<R>>,
    label: &'static str,
    /// Unread data bytes of the current entry.
    remaining: u64,
    /// Padding after the current entry's data.
    padding: u64,
    global_pax: HashMap<String, String>,
    has_current: bool,
    exhausted: bool,
}

impl<R: Read> TarHandle<R> {
    /// Wrap a byte stream positioned at the first header block.
    pub fn new(reader: R) -> Self {
        Self::with_label(reader, "TAR")
    }

    /// Same as [`new`](Self::new), reporting `label` as the format name.
    pub fn with_label(reader: R, label: &'static str) -> Self {
        Self {
            reader: Some(BufReader::new(reader)),
            label,
            remaining: 0,
            padding: 0,
            global_pax: HashMap::new(),
            has_current: false,
            exhausted: false,
        }
    }

    fn read_extension_data(reader: &mut BufReader<R>, size: u64) -> Result<Vec<u8>> {
        if size > MAX_EXTENSION_SIZE {
            return Err(UnarcError::invalid_header(format!(
                "extension header of {} bytes is too large",
                size
            )));
        }
        let mut data = vec![0u8; size as usize];
        if size > 0 && !stream::read_full(reader, &mut data)? {
            return Err(UnarcError::unexpected_eof(size));
        }
        stream::skip(reader, padding_for(size))?;
        Ok(data)
    }
}

impl<R: Read> ArchiveHandle for TarHandle<R> {
    fn format_name(&self) -> &str {
        self.label
    }

    fn is_encrypted(&self) -> bool {
        false
    }

    fn next_entry(&mut self) -> Result<Option<EntryDescriptor>> {
        let reader = self.reader.as_mut().ok_or(UnarcError::Closed)?;

        stream::skip(reader, self.remaining + self.padding)?;
        self.remaining = 0;
        self.padding = 0;
        self.has_current = false;

        if self.exhausted {
            return Ok(None);
        }

        let mut pax_attrs: HashMap<String, String> = HashMap::new();
        let mut gnu_longname: Option<String> = None;
        let mut gnu_longlink: Option<String> = None;

        loop {
            let mut block = [0u8; BLOCK_SIZE];
            if !stream::read_full(reader, &mut block)? {
                debug!("TAR stream ended without an end-of-archive marker");
                self.exhausted = true;
                return Ok(None);
            }

            let Some(mut header) = TarHeader::from_block(&block)? else {
                self.exhausted = true;
                return Ok(None);
            };

            if header.is_extension() {
                let data = Self::read_extension_data(reader, header.size)?;
                match header.typeflag {
                    PAX_GLOBAL_HEADER => self.global_pax.extend(TarHeader::parse_pax_data(&data)),
                    PAX_HEADER => pax_attrs = TarHeader::parse_pax_data(&data),
                    GNU_LONGNAME => {
                        gnu_longname =
                            Some(String::from_utf8_lossy(&data).trim_end_matches('\0').to_string())
                    }
                    _ => {
                        gnu_longlink =
                            Some(String::from_utf8_lossy(&data).trim_end_matches('\0').to_string())
                    }
                }
                continue;
            }

            // Global first, then local PAX, then GNU names
            if !self.global_pax.is_empty() {
                header.apply_pax_attrs(&self.global_pax);
            }
            if !pax_attrs.is_empty() {
                header.apply_pax_attrs(&std::mem::take(&mut pax_attrs));
            }
            if let Some(name) = gnu_longname.take() {
                header.name = name;
            }
            if let Some(link) = gnu_longlink.take() {
                header.linkname = link;
            }

            trace!(
                name = %header.name,
                size = header.size,
                typeflag = header.typeflag,
                "read TAR header"
            );

            padded_len(header.size)?;
            self.remaining = header.size;
            self.padding = padding_for(header.size);

            if header.kind() == TarEntryKind::Other {
                debug!(
                    name = %header.name,
                    typeflag = %char::from(header.typeflag),
                    link = %header.linkname,
                    "skipping TAR entry that is neither file nor directory"
                );
                stream::skip(reader, self.remaining + self.padding)?;
                self.remaining = 0;
                self.padding = 0;
                continue;
            }

            self.has_current = true;
            return Ok(Some(header.to_descriptor()));
        }
    }

    fn entry_reader(&mut self) -> Result<Box<dyn Read + '_>> {
        let reader = self.reader.as_mut().ok_or(UnarcError::Closed)?;
        if !self.has_current {
            return Err(UnarcError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                "no current TAR entry",
            )));
        }
        Ok(Box::new(Bounded::new(reader, Some(&mut self.remaining))))
    }

    fn close(&mut self) -> Result<()> {
        if self.reader.take().is_some() {
            trace!(format = self.label, "closed TAR handle");
        }
        self.has_current = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TarBuilder;
    use std::io::Cursor;

    fn handle(bytes: Vec<u8>) -> TarHandle<Cursor<Vec<u8>>> {
        TarHandle::new(Cursor::new(bytes))
    }

    fn read_all(handle: &mut TarHandle<Cursor<Vec<u8>>>) -> Vec<u8> {
        let mut data = Vec::new();
        handle
            .entry_reader()
            .unwrap()
            .read_to_end(&mut data)
            .unwrap();
        data
    }

    #[test]
    fn test_parse_octal() {
        assert_eq!(TarHeader::parse_numeric(b"0000644\0").unwrap(), 0o644);
        assert_eq!(TarHeader::parse_numeric(b"   755 \0").unwrap(), 0o755);
        assert_eq!(TarHeader::parse_numeric(b"\0\0\0\0").unwrap(), 0);
        assert!(TarHeader::parse_numeric(b"12x4\0").is_err());
    }

    #[test]
    fn test_parse_base256() {
        let mut field = [0u8; 12];
        field[0] = 0x80;
        field[7..].copy_from_slice(&[0x01, 0x00, 0x00, 0x00, 0x2A]);
        assert_eq!(TarHeader::parse_numeric(&field).unwrap(), 0x01_0000_002A);

        // 2^64 does not fit
        let mut wide = [0u8; 12];
        wide[0] = 0x80;
        wide[3] = 0x01;
        assert!(matches!(
            TarHeader::parse_numeric(&wide),
            Err(UnarcError::InvalidHeader { .. })
        ));
    }

    /// Rewrite the size field of the first header and fix up its checksum.
    fn with_size_field(mut bytes: Vec<u8>, size: [u8; 12]) -> Vec<u8> {
        bytes[124..136].copy_from_slice(&size);
        bytes[148..156].copy_from_slice(b"        ");
        let checksum: u32 = bytes[..BLOCK_SIZE].iter().map(|&b| b as u32).sum();
        bytes[148..156].copy_from_slice(format!("{:06o}\0 ", checksum).as_bytes());
        bytes
    }

    #[test]
    fn test_size_near_u64_max_rejected() {
        // 0xFFFF_FFFF_FFFF_FFF0: parses, but padding to a block overflows
        let mut size = [0xFFu8; 12];
        size[..4].copy_from_slice(&[0x80, 0, 0, 0]);
        size[11] = 0xF0;

        for bytes in [
            TarBuilder::new().symlink("link", "target").finish(),
            TarBuilder::new().file("huge.bin", b"x").finish(),
        ] {
            let mut tar = handle(with_size_field(bytes, size));
            assert!(matches!(
                tar.next_entry(),
                Err(UnarcError::InvalidHeader { .. })
            ));
        }
    }

    #[test]
    fn test_files_and_directories() {
        let bytes = TarBuilder::new()
            .directory("src")
            .file_with_mode("src/main.rs", b"fn main() {}", 0o755)
            .file("README", b"")
            .finish();
        let mut tar = handle(bytes);

        let dir = tar.next_entry().unwrap().unwrap();
        assert!(dir.is_directory);
        assert_eq!(dir.name, "src/");

        let main = tar.next_entry().unwrap().unwrap();
        assert_eq!(main.size, 12);
        assert_eq!(main.unix_mode, Some(0o755));
        assert_eq!(
            main.modified,
            Some(UNIX_EPOCH + Duration::from_secs(1_700_000_000))
        );
        assert_eq!(read_all(&mut tar), b"fn main() {}");

        let readme = tar.next_entry().unwrap().unwrap();
        assert_eq!(readme.size, 0);
        assert!(read_all(&mut tar).is_empty());

        assert!(tar.next_entry().unwrap().is_none());
        assert!(tar.next_entry().unwrap().is_none());
    }

    #[test]
    fn test_partial_read_then_advance() {
        let bytes = TarBuilder::new()
            .file("big.bin", &[9u8; 1500])
            .file("next.txt", b"next")
            .finish();
        let mut tar = handle(bytes);

        tar.next_entry().unwrap().unwrap();
        let mut head = [0u8; 100];
        tar.entry_reader().unwrap().read_exact(&mut head).unwrap();

        let next = tar.next_entry().unwrap().unwrap();
        assert_eq!(next.name, "next.txt");
        assert_eq!(read_all(&mut tar), b"next");
    }

    #[test]
    fn test_long_names() {
        let long = format!("{}/file.txt", "deep".repeat(40));
        let bytes = TarBuilder::new()
            .pax_file(&long, b"pax")
            .gnu_long_name_file(&long, b"gnu")
            .finish();
        let mut tar = handle(bytes);

        let pax = tar.next_entry().unwrap().unwrap();
        assert_eq!(pax.name, long);
        assert_eq!(read_all(&mut tar), b"pax");

        let gnu = tar.next_entry().unwrap().unwrap();
        assert_eq!(gnu.name, long);
        assert_eq!(read_all(&mut tar), b"gnu");
    }

    #[test]
    fn test_links_are_stepped_over() {
        let bytes = TarBuilder::new()
            .symlink("latest", "v1.txt")
            .file("v1.txt", b"one")
            .finish();
        let mut tar = handle(bytes);

        let entry = tar.next_entry().unwrap().unwrap();
        assert_eq!(entry.name, "v1.txt");
        assert!(tar.next_entry().unwrap().is_none());
    }

    #[test]
    fn test_missing_end_marker_is_tolerated() {
        let bytes = TarBuilder::new().file("a", b"a").finish_unterminated();
        let mut tar = handle(bytes);
        assert!(tar.next_entry().unwrap().is_some());
        assert!(tar.next_entry().unwrap().is_none());
    }

    #[test]
    fn test_bad_checksum_rejected() {
        let mut bytes = TarBuilder::new().file("a.txt", b"data").finish();
        bytes[0] = b'b';
        let mut tar = handle(bytes);
        assert!(matches!(
            tar.next_entry(),
            Err(UnarcError::InvalidHeader { .. })
        ));
    }

    #[test]
    fn test_truncated_data_detected() {
        let mut bytes = TarBuilder::new().file("a.bin", &[1u8; 1000]).finish();
        bytes.truncate(BLOCK_SIZE + 300);
        let mut tar = handle(bytes);
        tar.next_entry().unwrap().unwrap();

        let mut data = Vec::new();
        let err = tar
            .entry_reader()
            .unwrap()
            .read_to_end(&mut data)
            .unwrap_err();
        assert!(matches!(
            UnarcError::from(err),
            UnarcError::UnexpectedEof { expected: 700 }
        ));
    }

    #[test]
    fn test_close_then_use() {
        let mut tar = handle(TarBuilder::new().file("a", b"a").finish());
        tar.close().unwrap();
        tar.close().unwrap();
        assert!(matches!(tar.next_entry(), Err(UnarcError::Closed)));
        assert!(matches!(tar.entry_reader().err(), Some(UnarcError::Closed)));
    }

    #[test]
    fn test_parse_pax_data() {
        let attrs = TarHeader::parse_pax_data(b"16 path=a/b.txt\n11 size=42\n");
        assert_eq!(attrs.get("path").map(String::as_str), Some("a/b.txt"));
        assert_eq!(attrs.get("size").map(String::as_str), Some("42"));
    }
}
