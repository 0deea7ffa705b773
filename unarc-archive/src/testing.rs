//! In-memory archive builders for tests.
//!
//! These writers produce just enough of each format to exercise the
//! streaming handles: stored and deflated ZIP members, data descriptors,
//! the traditional encryption flag, UStar/PAX TAR headers and gzip wrapping.

use flate2::Compression;
use flate2::write::{DeflateEncoder, GzEncoder};
use std::io::Write;

use crate::tar::BLOCK_SIZE;
use crate::zip::{
    CENTRAL_DIR_HEADER_SIG, DATA_DESCRIPTOR_SIG, END_OF_CENTRAL_DIR_SIG, FLAG_DATA_DESCRIPTOR,
    FLAG_ENCRYPTED, LOCAL_FILE_HEADER_SIG,
};

/// DOS date for 2024-05-17, time 12:30:10.
const DOS_DATE: u16 = ((2024 - 1980) << 9) | (5 << 5) | 17;
const DOS_TIME: u16 = (12 << 11) | (30 << 5) | 5;

struct CentralRecord {
    name: String,
    flags: u16,
    method: u16,
    crc: u32,
    compressed: u32,
    uncompressed: u32,
    offset: u32,
}

/// Builds a ZIP archive member by member.
#[derive(Default)]
pub struct ZipBuilder {
    out: Vec<u8>,
    central: Vec<CentralRecord>,
}

impl ZipBuilder {
    /// Start an empty archive.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a stored (uncompressed) file.
    pub fn stored(mut self, name: &str, data: &[u8]) -> Self {
        self.push(name, 0, 0, data, crc(data), data.len() as u32, false);
        self
    }

    /// Add a deflated file with sizes in the local header.
    pub fn deflated(mut self, name: &str, data: &[u8]) -> Self {
        let packed = deflate(data);
        self.push(name, 0, 8, &packed, crc(data), data.len() as u32, false);
        self
    }

    /// Add a deflated file whose sizes and CRC follow the data in a descriptor.
    pub fn streamed(mut self, name: &str, data: &[u8]) -> Self {
        let packed = deflate(data);
        self.push(
            name,
            FLAG_DATA_DESCRIPTOR,
            8,
            &packed,
            crc(data),
            data.len() as u32,
            true,
        );
        self
    }

    /// Add a stored member whose sizes and CRC follow the data in a descriptor.
    ///
    /// Streaming writers emit empty files and directories this way.
    pub fn stored_streamed(mut self, name: &str, data: &[u8]) -> Self {
        self.push(
            name,
            FLAG_DATA_DESCRIPTOR,
            0,
            data,
            crc(data),
            data.len() as u32,
            true,
        );
        self
    }

    /// Add a directory marker.
    pub fn directory(mut self, name: &str) -> Self {
        let name = if name.ends_with('/') {
            name.to_string()
        } else {
            format!("{}/", name)
        };
        self.push(&name, 0, 0, &[], 0, 0, false);
        self
    }

    /// Add a member flagged as traditionally encrypted.
    ///
    /// The payload is scrambled stand-in bytes behind a 12-byte encryption
    /// header; nothing can decrypt it, which is the point.
    pub fn encrypted(mut self, name: &str, data: &[u8]) -> Self {
        let mut payload = vec![0xA5u8; 12];
        payload.extend(data.iter().map(|b| b ^ 0x5A));
        self.push(
            name,
            FLAG_ENCRYPTED,
            0,
            &payload,
            crc(data),
            data.len() as u32,
            false,
        );
        self
    }

    /// Add a stored file whose CRC field is deliberately wrong.
    pub fn corrupt(mut self, name: &str, data: &[u8]) -> Self {
        self.push(name, 0, 0, data, crc(data) ^ 0xFFFF_FFFF, data.len() as u32, false);
        self
    }

    #[allow(clippy::too_many_arguments)]
    fn push(
        &mut self,
        name: &str,
        flags: u16,
        method: u16,
        payload: &[u8],
        crc: u32,
        uncompressed: u32,
        descriptor: bool,
    ) {
        let offset = self.out.len() as u32;
        let compressed = payload.len() as u32;
        let (header_crc, header_compressed, header_uncompressed) = if descriptor {
            (0, 0, 0)
        } else {
            (crc, compressed, uncompressed)
        };

        put_u32(&mut self.out, LOCAL_FILE_HEADER_SIG);
        put_u16(&mut self.out, 20);
        put_u16(&mut self.out, flags);
        put_u16(&mut self.out, method);
        put_u16(&mut self.out, DOS_TIME);
        put_u16(&mut self.out, DOS_DATE);
        put_u32(&mut self.out, header_crc);
        put_u32(&mut self.out, header_compressed);
        put_u32(&mut self.out, header_uncompressed);
        put_u16(&mut self.out, name.len() as u16);
        put_u16(&mut self.out, 0);
        self.out.extend_from_slice(name.as_bytes());
        self.out.extend_from_slice(payload);

        if descriptor {
            put_u32(&mut self.out, DATA_DESCRIPTOR_SIG);
            put_u32(&mut self.out, crc);
            put_u32(&mut self.out, compressed);
            put_u32(&mut self.out, uncompressed);
        }

        self.central.push(CentralRecord {
            name: name.to_string(),
            flags,
            method,
            crc,
            compressed,
            uncompressed,
            offset,
        });
    }

    /// Write the central directory and return the archive bytes.
    pub fn finish(mut self) -> Vec<u8> {
        let cd_offset = self.out.len() as u32;
        for record in &self.central {
            put_u32(&mut self.out, CENTRAL_DIR_HEADER_SIG);
            put_u16(&mut self.out, 20);
            put_u16(&mut self.out, 20);
            put_u16(&mut self.out, record.flags);
            put_u16(&mut self.out, record.method);
            put_u16(&mut self.out, DOS_TIME);
            put_u16(&mut self.out, DOS_DATE);
            put_u32(&mut self.out, record.crc);
            put_u32(&mut self.out, record.compressed);
            put_u32(&mut self.out, record.uncompressed);
            put_u16(&mut self.out, record.name.len() as u16);
            put_u16(&mut self.out, 0);
            put_u16(&mut self.out, 0);
            put_u16(&mut self.out, 0);
            put_u16(&mut self.out, 0);
            put_u32(&mut self.out, 0);
            put_u32(&mut self.out, record.offset);
            self.out.extend_from_slice(record.name.as_bytes());
        }
        let cd_size = self.out.len() as u32 - cd_offset;

        put_u32(&mut self.out, END_OF_CENTRAL_DIR_SIG);
        put_u16(&mut self.out, 0);
        put_u16(&mut self.out, 0);
        put_u16(&mut self.out, self.central.len() as u16);
        put_u16(&mut self.out, self.central.len() as u16);
        put_u32(&mut self.out, cd_size);
        put_u32(&mut self.out, cd_offset);
        put_u16(&mut self.out, 0);
        self.out
    }
}

/// Builds a TAR archive member by member.
#[derive(Default)]
pub struct TarBuilder {
    out: Vec<u8>,
}

impl TarBuilder {
    /// Start an empty archive.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a regular file with mode 0644.
    pub fn file(self, name: &str, data: &[u8]) -> Self {
        self.file_with_mode(name, data, 0o644)
    }

    /// Add a regular file with an explicit mode.
    pub fn file_with_mode(mut self, name: &str, data: &[u8], mode: u32) -> Self {
        self.header(name, data.len() as u64, mode, b'0', "");
        self.data(data);
        self
    }

    /// Add a directory.
    pub fn directory(mut self, name: &str) -> Self {
        let name = if name.ends_with('/') {
            name.to_string()
        } else {
            format!("{}/", name)
        };
        self.header(&name, 0, 0o755, b'5', "");
        self
    }

    /// Add a symbolic link.
    pub fn symlink(mut self, name: &str, target: &str) -> Self {
        self.header(name, 0, 0o777, b'2', target);
        self
    }

    /// Add a file whose real name travels in a PAX extended header.
    pub fn pax_file(mut self, name: &str, data: &[u8]) -> Self {
        let record = pax_record("path", name);
        self.header("PaxHeader", record.len() as u64, 0o644, b'x', "");
        self.data(record.as_bytes());
        self.header("placeholder", data.len() as u64, 0o644, b'0', "");
        self.data(data);
        self
    }

    /// Add a file whose real name travels in a GNU long-name header.
    pub fn gnu_long_name_file(mut self, name: &str, data: &[u8]) -> Self {
        let mut long = name.as_bytes().to_vec();
        long.push(0);
        self.header("././@LongLink", long.len() as u64, 0o644, b'L', "");
        self.data(&long);
        self.header("truncated", data.len() as u64, 0o644, b'0', "");
        self.data(data);
        self
    }

    /// Append the end-of-archive marker and return the archive bytes.
    pub fn finish(mut self) -> Vec<u8> {
        self.out.extend_from_slice(&[0u8; BLOCK_SIZE * 2]);
        self.out
    }

    /// Return the archive bytes without the end-of-archive marker.
    pub fn finish_unterminated(self) -> Vec<u8> {
        self.out
    }

    fn header(&mut self, name: &str, size: u64, mode: u32, typeflag: u8, link: &str) {
        let mut block = [0u8; BLOCK_SIZE];
        write_field(&mut block[0..100], name.as_bytes());
        write_field(&mut block[100..108], format!("{:07o}\0", mode).as_bytes());
        write_field(&mut block[108..116], b"0001750\0");
        write_field(&mut block[116..124], b"0001750\0");
        write_field(&mut block[124..136], format!("{:011o}\0", size).as_bytes());
        write_field(&mut block[136..148], format!("{:011o}\0", 1_700_000_000u64).as_bytes());
        block[148..156].copy_from_slice(b"        ");
        block[156] = typeflag;
        write_field(&mut block[157..257], link.as_bytes());
        block[257..263].copy_from_slice(b"ustar\0");
        block[263..265].copy_from_slice(b"00");
        write_field(&mut block[265..297], b"unarc");
        write_field(&mut block[297..329], b"unarc");

        let checksum: u32 = block.iter().map(|&b| b as u32).sum();
        write_field(&mut block[148..156], format!("{:06o}\0 ", checksum).as_bytes());
        self.out.extend_from_slice(&block);
    }

    fn data(&mut self, data: &[u8]) {
        self.out.extend_from_slice(data);
        let padding = (BLOCK_SIZE - data.len() % BLOCK_SIZE) % BLOCK_SIZE;
        self.out.extend(std::iter::repeat_n(0u8, padding));
    }
}

/// Wrap bytes in a gzip stream.
pub fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(data)
        .and_then(|_| encoder.finish())
        .unwrap_or_default()
}

fn deflate(data: &[u8]) -> Vec<u8> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(data)
        .and_then(|_| encoder.finish())
        .unwrap_or_default()
}

fn crc(data: &[u8]) -> u32 {
    crc32fast::hash(data)
}

fn pax_record(key: &str, value: &str) -> String {
    // The length prefix counts itself, so settle it iteratively.
    let body = format!(" {}={}\n", key, value);
    let mut len = body.len() + 1;
    while len.to_string().len() + body.len() != len {
        len = len.to_string().len() + body.len();
    }
    format!("{}{}", len, body)
}

fn write_field(field: &mut [u8], value: &[u8]) {
    let n = value.len().min(field.len());
    field[..n].copy_from_slice(&value[..n]);
}

fn put_u16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn put_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}
