//! Archive format auto-detection.
//!
//! Detection looks at magic numbers only. [`ArchiveFormat::sniff`] works on
//! non-seekable streams: the prefix it inspects is replayed in front of the
//! remaining bytes.

use std::io::{Chain, Cursor, Read};
use unarc_core::error::Result;

use crate::stream;

/// Bytes needed to see the TAR "ustar" magic at offset 257.
pub const SNIFF_LEN: usize = 512;

/// Known archive formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    /// ZIP archive (.zip).
    Zip,
    /// TAR archive (.tar).
    Tar,
    /// GZIP compressed stream (.gz, .tgz).
    Gzip,
    /// RAR archive (.rar), recognized but not readable.
    Rar,
    /// 7-Zip archive (.7z), recognized but not readable.
    SevenZip,
    /// Unknown format.
    Unknown,
}

impl ArchiveFormat {
    /// Detect format from magic bytes.
    pub fn from_magic(magic: &[u8]) -> Self {
        // ZIP: local file header, or end of central directory for an empty archive
        if magic.starts_with(&[0x50, 0x4B, 0x03, 0x04])
            || magic.starts_with(&[0x50, 0x4B, 0x05, 0x06])
        {
            return Self::Zip;
        }

        // GZIP: 0x1F 0x8B
        if magic.starts_with(&[0x1F, 0x8B]) {
            return Self::Gzip;
        }

        // RAR 1.5-4.x and 5.x both start with "Rar!\x1A\x07"
        if magic.starts_with(b"Rar!\x1A\x07") {
            return Self::Rar;
        }

        // 7-Zip: 0x37 0x7A 0xBC 0xAF 0x27 0x1C
        if magic.starts_with(&[0x37, 0x7A, 0xBC, 0xAF, 0x27, 0x1C]) {
            return Self::SevenZip;
        }

        // TAR: "ustar" at offset 257 (covers both POSIX "ustar\0" and GNU "ustar ")
        if magic.len() >= 262 && &magic[257..262] == b"ustar" {
            return Self::Tar;
        }

        Self::Unknown
    }

    /// Detect the format of a stream without losing any of its bytes.
    ///
    /// Returns the format and a reader that yields the full original stream.
    pub fn sniff<R: Read>(mut reader: R) -> Result<(Self, Chain<Cursor<Vec<u8>>, R>)> {
        let mut magic = vec![0u8; SNIFF_LEN];
        let filled = stream::fill(&mut reader, &mut magic)?;
        magic.truncate(filled);

        let format = Self::from_magic(&magic);
        Ok((format, Cursor::new(magic).chain(reader)))
    }

    /// Get the typical file extension.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Zip => "zip",
            Self::Tar => "tar",
            Self::Gzip => "gz",
            Self::Rar => "rar",
            Self::SevenZip => "7z",
            Self::Unknown => "",
        }
    }
}

impl std::fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Zip => write!(f, "ZIP"),
            Self::Tar => write!(f, "TAR"),
            Self::Gzip => write!(f, "GZIP"),
            Self::Rar => write!(f, "RAR"),
            Self::SevenZip => write!(f, "7-Zip"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_zip() {
        let magic = [0x50, 0x4B, 0x03, 0x04];
        assert_eq!(ArchiveFormat::from_magic(&magic), ArchiveFormat::Zip);

        let empty = [0x50, 0x4B, 0x05, 0x06];
        assert_eq!(ArchiveFormat::from_magic(&empty), ArchiveFormat::Zip);
    }

    #[test]
    fn test_detect_gzip() {
        let magic = [0x1F, 0x8B, 0x08, 0x00];
        assert_eq!(ArchiveFormat::from_magic(&magic), ArchiveFormat::Gzip);
    }

    #[test]
    fn test_detect_rar() {
        assert_eq!(
            ArchiveFormat::from_magic(b"Rar!\x1A\x07\x00"),
            ArchiveFormat::Rar
        );
        assert_eq!(
            ArchiveFormat::from_magic(b"Rar!\x1A\x07\x01\x00"),
            ArchiveFormat::Rar
        );
    }

    #[test]
    fn test_detect_tar() {
        let mut block = vec![0u8; 512];
        block[257..263].copy_from_slice(b"ustar\0");
        assert_eq!(ArchiveFormat::from_magic(&block), ArchiveFormat::Tar);
    }

    #[test]
    fn test_detect_unknown() {
        let magic = [0x00, 0x00, 0x00, 0x00];
        assert_eq!(ArchiveFormat::from_magic(&magic), ArchiveFormat::Unknown);
        assert_eq!(ArchiveFormat::from_magic(&[]), ArchiveFormat::Unknown);
    }

    #[test]
    fn test_sniff_replays_prefix() {
        let mut data = vec![0x50, 0x4B, 0x03, 0x04];
        data.extend(std::iter::repeat_n(0xAB, 1000));

        let (format, mut reader) = ArchiveFormat::sniff(Cursor::new(data.clone())).unwrap();
        assert_eq!(format, ArchiveFormat::Zip);

        let mut replayed = Vec::new();
        reader.read_to_end(&mut replayed).unwrap();
        assert_eq!(replayed, data);
    }

    #[test]
    fn test_sniff_short_stream() {
        let (format, mut reader) = ArchiveFormat::sniff(Cursor::new(vec![1, 2, 3])).unwrap();
        assert_eq!(format, ArchiveFormat::Unknown);
        let mut replayed = Vec::new();
        reader.read_to_end(&mut replayed).unwrap();
        assert_eq!(replayed, vec![1, 2, 3]);
    }
}
