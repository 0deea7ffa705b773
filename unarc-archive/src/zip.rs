//! Streaming ZIP handle.
//!
//! Local file headers are walked front to back and the central directory is
//! never consulted, so the archive can come from a pipe. Entries using the
//! traditional or strong encryption flags are reported as encrypted and their
//! data is skipped by compressed size.
//!
//! Entries written with a trailing data descriptor carry no sizes in their
//! local header. Deflated ones are still readable because the deflate stream
//! marks its own end. Stored or encrypted ones cannot be delimited and fail
//! with [`UnarcError::UnsupportedMethod`].

use crate::stream::{self, Bounded};
use flate2::bufread::DeflateDecoder;
use std::io::{self, BufRead, BufReader, Read};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{debug, trace};
use unarc_core::error::{Result, UnarcError};
use unarc_core::{ArchiveHandle, EntryDescriptor};

/// ZIP local file header signature.
pub const LOCAL_FILE_HEADER_SIG: u32 = 0x04034B50;

/// ZIP central directory header signature.
pub const CENTRAL_DIR_HEADER_SIG: u32 = 0x02014B50;

/// ZIP end of central directory signature.
pub const END_OF_CENTRAL_DIR_SIG: u32 = 0x06054B50;

/// ZIP64 end of central directory signature.
pub const ZIP64_END_OF_CENTRAL_DIR_SIG: u32 = 0x06064B50;

/// Data descriptor signature (optional, PK\x07\x08).
pub const DATA_DESCRIPTOR_SIG: u32 = 0x08074B50;

/// ZIP64 extra field header ID.
pub const ZIP64_EXTRA_FIELD_ID: u16 = 0x0001;

/// Marker value for Zip64 (0xFFFFFFFF for 32-bit fields).
pub const ZIP64_MARKER_32: u32 = 0xFFFF_FFFF;

/// Flag bit for traditional PKWARE encryption.
pub const FLAG_ENCRYPTED: u16 = 0x0001;

/// Flag bit for data descriptor presence.
pub const FLAG_DATA_DESCRIPTOR: u16 = 0x0008;

/// Flag bit for strong encryption.
pub const FLAG_STRONG_ENCRYPTION: u16 = 0x0040;

/// Signature, CRC and both 32-bit sizes of a descriptor for an empty entry.
const EMPTY_DESCRIPTOR_PEEK: usize = 16;

/// ZIP compression methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMethod {
    /// Stored (no compression).
    Stored,
    /// Deflate compression.
    Deflate,
    /// Unknown method.
    Unknown(u16),
}

impl CompressionMethod {
    /// Create from a u16 value.
    pub fn from_u16(value: u16) -> Self {
        match value {
            0 => Self::Stored,
            8 => Self::Deflate,
            _ => Self::Unknown(value),
        }
    }
}

impl std::fmt::Display for CompressionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stored => write!(f, "Stored"),
            Self::Deflate => write!(f, "Deflate"),
            Self::Unknown(id) => write!(f, "Unknown({})", id),
        }
    }
}

/// ZIP local file header.
#[derive(Debug, Clone)]
pub struct LocalFileHeader {
    /// Minimum version needed to extract.
    pub version_needed: u16,
    /// General purpose bit flag.
    pub flags: u16,
    /// Compression method.
    pub method: CompressionMethod,
    /// Last modification time (DOS format).
    pub mtime: u16,
    /// Last modification date (DOS format).
    pub mdate: u16,
    /// CRC-32 of uncompressed data.
    pub crc32: u32,
    /// Compressed size, Zip64 value when present.
    pub compressed_size: u64,
    /// Uncompressed size, Zip64 value when present.
    pub uncompressed_size: u64,
    /// File name.
    pub filename: String,
    /// Whether a Zip64 extra field was present.
    pub zip64: bool,
}

impl LocalFileHeader {
    /// Read a local file header whose signature has already been consumed.
    pub fn read_after_signature<R: Read>(reader: &mut R) -> Result<Self> {
        let mut buf = [0u8; 26];
        if !stream::read_full(reader, &mut buf)? {
            return Err(UnarcError::unexpected_eof(buf.len() as u64));
        }

        let version_needed = u16::from_le_bytes([buf[0], buf[1]]);
        let flags = u16::from_le_bytes([buf[2], buf[3]]);
        let method = CompressionMethod::from_u16(u16::from_le_bytes([buf[4], buf[5]]));
        let mtime = u16::from_le_bytes([buf[6], buf[7]]);
        let mdate = u16::from_le_bytes([buf[8], buf[9]]);
        let crc32 = u32::from_le_bytes([buf[10], buf[11], buf[12], buf[13]]);
        let compressed_size = u32::from_le_bytes([buf[14], buf[15], buf[16], buf[17]]);
        let uncompressed_size = u32::from_le_bytes([buf[18], buf[19], buf[20], buf[21]]);
        let filename_len = u16::from_le_bytes([buf[22], buf[23]]) as usize;
        let extra_len = u16::from_le_bytes([buf[24], buf[25]]) as usize;

        let mut filename_bytes = vec![0u8; filename_len];
        if filename_len > 0 && !stream::read_full(reader, &mut filename_bytes)? {
            return Err(UnarcError::unexpected_eof(filename_len as u64));
        }
        let filename = String::from_utf8_lossy(&filename_bytes).into_owned();

        let mut extra = vec![0u8; extra_len];
        if extra_len > 0 && !stream::read_full(reader, &mut extra)? {
            return Err(UnarcError::unexpected_eof(extra_len as u64));
        }

        let zip64_field = Self::find_zip64_extra(&extra);
        let (uncompressed_64, compressed_64) = match zip64_field {
            Some(field) => Self::parse_zip64_sizes(field, uncompressed_size, compressed_size),
            None => (None, None),
        };

        Ok(Self {
            version_needed,
            flags,
            method,
            mtime,
            mdate,
            crc32,
            compressed_size: compressed_64.unwrap_or(compressed_size as u64),
            uncompressed_size: uncompressed_64.unwrap_or(uncompressed_size as u64),
            filename,
            zip64: zip64_field.is_some(),
        })
    }

    /// Locate the Zip64 extended information field in an extra block.
    fn find_zip64_extra(extra: &[u8]) -> Option<&[u8]> {
        let mut offset = 0;
        while offset + 4 <= extra.len() {
            let header_id = u16::from_le_bytes([extra[offset], extra[offset + 1]]);
            let data_size = u16::from_le_bytes([extra[offset + 2], extra[offset + 3]]) as usize;
            offset += 4;
            if offset + data_size > extra.len() {
                return None;
            }
            if header_id == ZIP64_EXTRA_FIELD_ID {
                return Some(&extra[offset..offset + data_size]);
            }
            offset += data_size;
        }
        None
    }

    /// Sizes in the Zip64 field appear only for header fields set to the marker,
    /// uncompressed first.
    fn parse_zip64_sizes(
        field: &[u8],
        uncompressed_size: u32,
        compressed_size: u32,
    ) -> (Option<u64>, Option<u64>) {
        let mut values = field
            .chunks_exact(8)
            .map(|c| u64::from_le_bytes([c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7]]));

        let uncompressed = if uncompressed_size == ZIP64_MARKER_32 {
            values.next()
        } else {
            None
        };
        let compressed = if compressed_size == ZIP64_MARKER_32 {
            values.next()
        } else {
            None
        };
        (uncompressed, compressed)
    }

    /// Whether the entry's data is encrypted.
    pub fn is_encrypted(&self) -> bool {
        self.flags & (FLAG_ENCRYPTED | FLAG_STRONG_ENCRYPTION) != 0
    }

    /// Check if this entry has a data descriptor following the compressed data.
    pub fn has_data_descriptor(&self) -> bool {
        self.flags & FLAG_DATA_DESCRIPTOR != 0
    }

    /// Whether the compressed length is known before reading the data.
    pub fn is_sized(&self) -> bool {
        !self.has_data_descriptor() || self.compressed_size != 0
    }

    /// Whether the entry is a directory marker.
    pub fn is_directory(&self) -> bool {
        self.filename.ends_with('/')
    }

    /// Convert DOS date/time to SystemTime.
    pub fn modified_time(&self) -> Option<SystemTime> {
        let year = ((self.mdate >> 9) & 0x7F) as i64 + 1980;
        let month = ((self.mdate >> 5) & 0x0F) as i64;
        let day = (self.mdate & 0x1F) as i64;
        if !(1..=12).contains(&month) || day == 0 {
            return None;
        }

        let hours = ((self.mtime >> 11) & 0x1F) as i64;
        let minutes = ((self.mtime >> 5) & 0x3F) as i64;
        let seconds = (self.mtime & 0x1F) as i64 * 2;

        let days = days_from_civil(year, month, day);
        let total = days * 86_400 + hours * 3_600 + minutes * 60 + seconds;
        u64::try_from(total)
            .ok()
            .map(|secs| UNIX_EPOCH + Duration::from_secs(secs))
    }

    /// Convert to an entry descriptor.
    pub fn to_descriptor(&self) -> EntryDescriptor {
        let mut entry = if self.is_directory() {
            EntryDescriptor::directory(&self.filename)
        } else {
            EntryDescriptor::file(&self.filename, self.uncompressed_size)
        };
        entry = entry.with_encrypted(self.is_encrypted());
        if let Some(modified) = self.modified_time() {
            entry = entry.with_modified(modified);
        }
        entry
    }
}

/// Days since 1970-01-01 for a proleptic Gregorian date.
fn days_from_civil(year: i64, month: i64, day: i64) -> i64 {
    let year = if month <= 2 { year - 1 } else { year };
    let era = year.div_euclid(400);
    let yoe = year - era * 400;
    let mp = (month + 9) % 12;
    let doy = (153 * mp + 2) / 5 + day - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468
}

/// ZIP data descriptor (appears after compressed data when FLAG_DATA_DESCRIPTOR is set).
#[derive(Debug, Clone, Copy)]
pub struct DataDescriptor {
    /// CRC-32 of uncompressed data.
    pub crc32: u32,
    /// Compressed size.
    pub compressed_size: u64,
    /// Uncompressed size.
    pub uncompressed_size: u64,
}

impl DataDescriptor {
    /// Read a data descriptor.
    ///
    /// The descriptor may optionally start with a signature (0x08074B50).
    pub fn read<R: Read>(reader: &mut R, is_zip64: bool) -> Result<Self> {
        let mut word = [0u8; 4];
        read_exact(reader, &mut word)?;

        let first_word = u32::from_le_bytes(word);
        let crc32 = if first_word == DATA_DESCRIPTOR_SIG {
            read_exact(reader, &mut word)?;
            u32::from_le_bytes(word)
        } else {
            first_word
        };

        let (compressed_size, uncompressed_size) = if is_zip64 {
            let mut buf64 = [0u8; 8];
            read_exact(reader, &mut buf64)?;
            let compressed = u64::from_le_bytes(buf64);
            read_exact(reader, &mut buf64)?;
            (compressed, u64::from_le_bytes(buf64))
        } else {
            read_exact(reader, &mut word)?;
            let compressed = u32::from_le_bytes(word) as u64;
            read_exact(reader, &mut word)?;
            (compressed, u32::from_le_bytes(word) as u64)
        };

        Ok(Self {
            crc32,
            compressed_size,
            uncompressed_size,
        })
    }
}

fn read_exact<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<()> {
    if stream::read_full(reader, buf)? {
        Ok(())
    } else {
        Err(UnarcError::unexpected_eof(buf.len() as u64))
    }
}

fn verify(expected_crc: u32, expected_size: u64, crc: u32, size: u64) -> Result<()> {
    if size < expected_size {
        return Err(UnarcError::unexpected_eof(expected_size - size));
    }
    if size > expected_size {
        return Err(UnarcError::invalid_header(format!(
            "entry holds {} bytes but its header declares {}",
            size, expected_size
        )));
    }
    if crc != expected_crc {
        return Err(UnarcError::crc_mismatch(expected_crc, crc));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReadState {
    Untouched,
    Partial,
    Finished,
}

#[derive(Debug)]
struct Progress {
    state: ReadState,
    /// CRC and length of the decoded bytes once the reader hit end of data.
    computed: Option<(u32, u64)>,
}

#[derive(Debug)]
struct Current {
    header: LocalFileHeader,
    /// Compressed bytes not yet pulled from the stream, when known.
    remaining: Option<u64>,
    progress: Progress,
}

/// Forward-only ZIP reader implementing [`ArchiveHandle`].
pub struct ZipHandle<R: Read> {
    reader: Option<BufReader<R>>,
    current: Option<Current>,
    exhausted: bool,
}

impl<R: Read> ZipHandle<R> {
    /// Wrap a byte stream positioned at the first local file header.
    pub fn new(reader: R) -> Self {
        Self {
            reader: Some(BufReader::new(reader)),
            current: None,
            exhausted: false,
        }
    }

    /// Whether a descriptor of an empty entry starts right at the stream position.
    ///
    /// Only the buffered bytes are inspected; a short buffer counts as "no".
    fn empty_entry_follows(reader: &mut BufReader<R>) -> Result<bool> {
        let buf = reader.fill_buf()?;
        Ok(buf.len() >= EMPTY_DESCRIPTOR_PEEK
            && buf[..4] == DATA_DESCRIPTOR_SIG.to_le_bytes()
            && buf[4..EMPTY_DESCRIPTOR_PEEK].iter().all(|&b| b == 0))
    }

    /// Move the stream past whatever is left of the current entry.
    fn finish_entry(reader: &mut BufReader<R>, current: Current) -> Result<()> {
        let Current {
            header,
            remaining,
            progress,
        } = current;

        match remaining {
            Some(count) => stream::skip(reader, count)?,
            None if progress.state == ReadState::Finished => {}
            None if progress.state == ReadState::Untouched
                && header.method == CompressionMethod::Deflate
                && !header.is_encrypted() =>
            {
                // Only the deflate stream itself knows where it ends.
                let mut decoder = DeflateDecoder::new(Bounded::new(reader, None));
                io::copy(&mut decoder, &mut io::sink())?;
            }
            None => {
                return Err(UnarcError::unsupported_method(format!(
                    "cannot locate the end of '{}' ({}) without a central directory",
                    header.filename, header.method
                )));
            }
        }

        if header.has_data_descriptor() {
            let descriptor = DataDescriptor::read(reader, header.zip64)?;
            if let Some((crc, size)) = progress.computed {
                verify(descriptor.crc32, descriptor.uncompressed_size, crc, size)?;
            }
        }
        Ok(())
    }
}

impl<R: Read> ArchiveHandle for ZipHandle<R> {
    fn format_name(&self) -> &str {
        "ZIP"
    }

    fn is_encrypted(&self) -> bool {
        // ZIP has no archive-wide encryption; the central directory is never read.
        false
    }

    fn next_entry(&mut self) -> Result<Option<EntryDescriptor>> {
        let reader = self.reader.as_mut().ok_or(UnarcError::Closed)?;

        if let Some(current) = self.current.take() {
            Self::finish_entry(reader, current)?;
        }
        if self.exhausted {
            return Ok(None);
        }

        let mut sig = [0u8; 4];
        if !stream::read_full(reader, &mut sig)? {
            debug!("ZIP stream ended without a central directory");
            self.exhausted = true;
            return Ok(None);
        }

        match u32::from_le_bytes(sig) {
            LOCAL_FILE_HEADER_SIG => {}
            CENTRAL_DIR_HEADER_SIG | END_OF_CENTRAL_DIR_SIG | ZIP64_END_OF_CENTRAL_DIR_SIG => {
                self.exhausted = true;
                return Ok(None);
            }
            other => {
                return Err(UnarcError::invalid_magic(
                    LOCAL_FILE_HEADER_SIG.to_le_bytes().to_vec(),
                    other.to_le_bytes().to_vec(),
                ));
            }
        }

        let header = LocalFileHeader::read_after_signature(reader)?;
        trace!(
            name = %header.filename,
            method = %header.method,
            flags = header.flags,
            "read ZIP local header"
        );

        let descriptor = header.to_descriptor();
        let remaining = if header.is_sized() {
            Some(header.compressed_size)
        } else if header.method != CompressionMethod::Deflate
            && (header.is_directory() || Self::empty_entry_follows(reader)?)
        {
            Some(0)
        } else {
            None
        };
        self.current = Some(Current {
            header,
            remaining,
            progress: Progress {
                state: ReadState::Untouched,
                computed: None,
            },
        });
        Ok(Some(descriptor))
    }

    fn entry_reader(&mut self) -> Result<Box<dyn Read + '_>> {
        let reader = self.reader.as_mut().ok_or(UnarcError::Closed)?;
        let current = self.current.as_mut().ok_or_else(|| {
            UnarcError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                "no current ZIP entry",
            ))
        })?;

        let header = current.header.clone();
        if header.is_encrypted() {
            return Err(UnarcError::unsupported_method(format!(
                "'{}' is encrypted",
                header.filename
            )));
        }
        if current.progress.state != ReadState::Untouched {
            return Err(UnarcError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("data of '{}' was already read", header.filename),
            )));
        }

        let sized = current.remaining.is_some();
        let source = Bounded::new(reader, current.remaining.as_mut());
        let body: Box<dyn Read + '_> = match (header.method, sized) {
            (CompressionMethod::Stored, true) => Box::new(source),
            (CompressionMethod::Deflate, _) => Box::new(DeflateDecoder::new(source)),
            (CompressionMethod::Stored, false) => {
                return Err(UnarcError::unsupported_method(
                    "stored entry with a data descriptor",
                ));
            }
            (CompressionMethod::Unknown(id), _) => {
                return Err(UnarcError::unsupported_method(format!("ZIP method {}", id)));
            }
        };

        current.progress.state = ReadState::Partial;
        Ok(Box::new(ZipEntryReader {
            body,
            header,
            hasher: crc32fast::Hasher::new(),
            produced: 0,
            progress: &mut current.progress,
        }))
    }

    fn close(&mut self) -> Result<()> {
        if self.reader.take().is_some() {
            trace!("closed ZIP handle");
        }
        self.current = None;
        Ok(())
    }
}

/// Decoded bytes of one entry, checked against the header at end of data.
struct ZipEntryReader<'a> {
    body: Box<dyn Read + 'a>,
    header: LocalFileHeader,
    hasher: crc32fast::Hasher,
    produced: u64,
    progress: &'a mut Progress,
}

impl Read for ZipEntryReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.body.read(buf)?;
        if n > 0 {
            self.hasher.update(&buf[..n]);
            self.produced += n as u64;
            return Ok(n);
        }
        if buf.is_empty() || self.progress.state == ReadState::Finished {
            return Ok(0);
        }

        let crc = self.hasher.clone().finalize();
        self.progress.state = ReadState::Finished;
        self.progress.computed = Some((crc, self.produced));
        if !self.header.has_data_descriptor() {
            verify(
                self.header.crc32,
                self.header.uncompressed_size,
                crc,
                self.produced,
            )?;
        }
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ZipBuilder;
    use std::io::Cursor;

    fn handle(bytes: Vec<u8>) -> ZipHandle<Cursor<Vec<u8>>> {
        ZipHandle::new(Cursor::new(bytes))
    }

    fn read_all(handle: &mut ZipHandle<Cursor<Vec<u8>>>) -> Vec<u8> {
        let mut data = Vec::new();
        handle
            .entry_reader()
            .unwrap()
            .read_to_end(&mut data)
            .unwrap();
        data
    }

    #[test]
    fn test_stored_and_deflated_entries() {
        let text = "Test data file. ".repeat(100);
        let bytes = ZipBuilder::new()
            .stored("a.txt", b"alpha")
            .deflated("b.txt", text.as_bytes())
            .finish();
        let mut zip = handle(bytes);

        let a = zip.next_entry().unwrap().unwrap();
        assert_eq!(a.name, "a.txt");
        assert_eq!(a.size, 5);
        assert!(a.modified.is_some());
        assert_eq!(read_all(&mut zip), b"alpha");

        let b = zip.next_entry().unwrap().unwrap();
        assert_eq!(b.size, text.len() as u64);
        assert_eq!(read_all(&mut zip), text.as_bytes());

        assert!(zip.next_entry().unwrap().is_none());
        assert!(zip.next_entry().unwrap().is_none());
    }

    #[test]
    fn test_unread_entries_are_skipped() {
        let bytes = ZipBuilder::new()
            .deflated("skip.bin", &[7u8; 4096])
            .stored("keep.txt", b"kept")
            .finish();
        let mut zip = handle(bytes);

        zip.next_entry().unwrap().unwrap();
        let keep = zip.next_entry().unwrap().unwrap();
        assert_eq!(keep.name, "keep.txt");
        assert_eq!(read_all(&mut zip), b"kept");
    }

    #[test]
    fn test_directory_and_encryption_flags() {
        let bytes = ZipBuilder::new()
            .directory("docs")
            .encrypted("docs/secret.txt", b"classified")
            .stored("docs/public.txt", b"open")
            .finish();
        let mut zip = handle(bytes);

        let dir = zip.next_entry().unwrap().unwrap();
        assert!(dir.is_directory);
        assert_eq!(dir.name, "docs/");

        let secret = zip.next_entry().unwrap().unwrap();
        assert!(secret.is_encrypted);
        assert_eq!(secret.size, 10);
        assert!(matches!(
            zip.entry_reader().err(),
            Some(UnarcError::UnsupportedMethod { .. })
        ));

        let public = zip.next_entry().unwrap().unwrap();
        assert!(!public.is_encrypted);
        assert_eq!(read_all(&mut zip), b"open");
    }

    #[test]
    fn test_data_descriptor_entries() {
        let text = b"streamed without sizes ".repeat(40);
        let bytes = ZipBuilder::new()
            .streamed("first.txt", &text)
            .streamed("second.txt", b"tail")
            .stored("third.txt", b"end")
            .finish();
        let mut zip = handle(bytes);

        zip.next_entry().unwrap().unwrap();
        assert_eq!(read_all(&mut zip), text);

        // Never read: must be decoded past to find the next header.
        zip.next_entry().unwrap().unwrap();

        let third = zip.next_entry().unwrap().unwrap();
        assert_eq!(third.name, "third.txt");
        assert_eq!(read_all(&mut zip), b"end");
    }

    #[test]
    fn test_empty_stored_descriptor_entries() {
        let bytes = ZipBuilder::new()
            .stored_streamed("dir/", b"")
            .stored_streamed("empty.txt", b"")
            .stored("dir/a.txt", b"after")
            .finish();
        let mut zip = handle(bytes);

        let dir = zip.next_entry().unwrap().unwrap();
        assert!(dir.is_directory);

        let empty = zip.next_entry().unwrap().unwrap();
        assert_eq!(empty.name, "empty.txt");
        assert!(read_all(&mut zip).is_empty());

        let after = zip.next_entry().unwrap().unwrap();
        assert_eq!(after.name, "dir/a.txt");
        assert_eq!(read_all(&mut zip), b"after");
        assert!(zip.next_entry().unwrap().is_none());
    }

    #[test]
    fn test_stored_descriptor_entry_with_data_unsupported() {
        let bytes = ZipBuilder::new()
            .stored_streamed("data.bin", b"cannot find my end")
            .finish();
        let mut zip = handle(bytes);
        zip.next_entry().unwrap().unwrap();

        assert!(matches!(
            zip.entry_reader(),
            Err(UnarcError::UnsupportedMethod { .. })
        ));
        assert!(matches!(
            zip.next_entry(),
            Err(UnarcError::UnsupportedMethod { .. })
        ));
    }

    #[test]
    fn test_crc_mismatch_detected() {
        let bytes = ZipBuilder::new().corrupt("bad.txt", b"payload").finish();
        let mut zip = handle(bytes);
        zip.next_entry().unwrap().unwrap();

        let mut data = Vec::new();
        let err = zip
            .entry_reader()
            .unwrap()
            .read_to_end(&mut data)
            .unwrap_err();
        assert!(matches!(
            UnarcError::from(err),
            UnarcError::CrcMismatch { .. }
        ));
    }

    #[test]
    fn test_truncated_entry_detected() {
        let mut bytes = ZipBuilder::new()
            .stored("cut.txt", &[1u8; 200])
            .finish();
        bytes.truncate(30 + "cut.txt".len() + 50);
        let mut zip = handle(bytes);
        zip.next_entry().unwrap().unwrap();

        let mut data = Vec::new();
        let err = zip
            .entry_reader()
            .unwrap()
            .read_to_end(&mut data)
            .unwrap_err();
        assert!(matches!(
            UnarcError::from(err),
            UnarcError::UnexpectedEof { .. }
        ));
    }

    #[test]
    fn test_garbage_signature_rejected() {
        let mut zip = handle(vec![0xDE, 0xAD, 0xBE, 0xEF, 0, 0, 0, 0]);
        assert!(matches!(
            zip.next_entry(),
            Err(UnarcError::InvalidMagic { .. })
        ));
    }

    #[test]
    fn test_close_is_idempotent() {
        let mut zip = handle(ZipBuilder::new().stored("a", b"a").finish());
        zip.close().unwrap();
        zip.close().unwrap();
        assert!(matches!(zip.next_entry(), Err(UnarcError::Closed)));
    }

    #[test]
    fn test_dos_time_conversion() {
        let header = LocalFileHeader {
            version_needed: 20,
            flags: 0,
            method: CompressionMethod::Stored,
            // 2000-01-01 00:00:00
            mtime: 0,
            mdate: (20 << 9) | (1 << 5) | 1,
            crc32: 0,
            compressed_size: 0,
            uncompressed_size: 0,
            filename: "x".into(),
            zip64: false,
        };
        let expected = UNIX_EPOCH + Duration::from_secs(946_684_800);
        assert_eq!(header.modified_time(), Some(expected));
    }
}
