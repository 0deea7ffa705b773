//! Error types for unarc operations.
//!
//! Errors fall into three families:
//!
//! - configuration errors, raised by precondition checks before any archive
//!   is opened
//! - archive errors, raised by a parser while opening or decoding
//! - I/O errors from the underlying byte source or destination
//!
//! Encrypted content is not an error. It is skipped and reported through
//! logging only.

use std::io;
use thiserror::Error;

/// The main error type for unarc operations.
#[derive(Debug, Error)]
pub enum UnarcError {
    /// A missing argument or a failed precondition on a path.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the failed precondition.
        message: String,
    },

    /// I/O error from the underlying reader or writer.
    #[error("I/O error: {0}")]
    Io(#[source] io::Error),

    /// Invalid magic number in an archive header.
    #[error("Invalid magic number: expected {expected:02x?}, found {found:02x?}")]
    InvalidMagic {
        /// Expected magic bytes.
        expected: Vec<u8>,
        /// Actual magic bytes found.
        found: Vec<u8>,
    },

    /// Invalid header format.
    #[error("Invalid header: {message}")]
    InvalidHeader {
        /// Description of the header error.
        message: String,
    },

    /// The byte source is not an archive format any backend can read.
    #[error("Unsupported archive format: {format}")]
    UnsupportedFormat {
        /// Name of the detected format, or "unknown".
        format: String,
    },

    /// Unsupported compression method for an entry.
    #[error("Unsupported compression method: {method}")]
    UnsupportedMethod {
        /// The compression method identifier.
        method: String,
    },

    /// CRC checksum mismatch.
    #[error("CRC mismatch: expected {expected:#x}, computed {computed:#x}")]
    CrcMismatch {
        /// Expected CRC value from the archive.
        expected: u32,
        /// Computed CRC value from the data.
        computed: u32,
    },

    /// Unexpected end of the archive stream.
    #[error("Unexpected end of file: expected {expected} more bytes")]
    UnexpectedEof {
        /// Number of bytes that were expected but not available.
        expected: u64,
    },

    /// Entry name escapes the destination (e.g. "../" or an absolute path).
    #[error("Path traversal detected in entry: {path}")]
    PathTraversal {
        /// The offending entry name.
        path: String,
    },

    /// The archive handle was used after it was closed.
    #[error("Archive handle is closed")]
    Closed,
}

/// Result type alias for unarc operations.
pub type Result<T> = std::result::Result<T, UnarcError>;

impl From<io::Error> for UnarcError {
    fn from(err: io::Error) -> Self {
        // Archive errors raised inside `Read` impls travel wrapped in io::Error.
        if !err.get_ref().is_some_and(|inner| inner.is::<UnarcError>()) {
            return Self::Io(err);
        }
        let kind = err.kind();
        match err.into_inner().map(|inner| inner.downcast::<UnarcError>()) {
            Some(Ok(inner)) => *inner,
            _ => Self::Io(io::Error::from(kind)),
        }
    }
}

impl From<UnarcError> for io::Error {
    fn from(err: UnarcError) -> Self {
        match err {
            UnarcError::Io(inner) => inner,
            other => io::Error::new(io::ErrorKind::InvalidData, other),
        }
    }
}

impl UnarcError {
    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an invalid magic error.
    pub fn invalid_magic(expected: impl Into<Vec<u8>>, found: impl Into<Vec<u8>>) -> Self {
        Self::InvalidMagic {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Create an invalid header error.
    pub fn invalid_header(message: impl Into<String>) -> Self {
        Self::InvalidHeader {
            message: message.into(),
        }
    }

    /// Create an unsupported format error.
    pub fn unsupported_format(format: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            format: format.into(),
        }
    }

    /// Create an unsupported method error.
    pub fn unsupported_method(method: impl Into<String>) -> Self {
        Self::UnsupportedMethod {
            method: method.into(),
        }
    }

    /// Create a CRC mismatch error.
    pub fn crc_mismatch(expected: u32, computed: u32) -> Self {
        Self::CrcMismatch { expected, computed }
    }

    /// Create an unexpected EOF error.
    pub fn unexpected_eof(expected: u64) -> Self {
        Self::UnexpectedEof { expected }
    }

    /// Create a path traversal error.
    pub fn path_traversal(path: impl Into<String>) -> Self {
        Self::PathTraversal { path: path.into() }
    }

    /// Whether this error was raised by a precondition check.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }

    /// Whether this error describes malformed or unsupported archive content.
    pub fn is_archive_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidMagic { .. }
                | Self::InvalidHeader { .. }
                | Self::UnsupportedFormat { .. }
                | Self::UnsupportedMethod { .. }
                | Self::CrcMismatch { .. }
                | Self::UnexpectedEof { .. }
                | Self::PathTraversal { .. }
                | Self::Closed
        )
    }

    /// Whether this error came from the underlying reader or writer.
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = UnarcError::invalid_magic(vec![0x50, 0x4B], vec![0x1F, 0x8B]);
        assert!(err.to_string().contains("Invalid magic"));

        let err = UnarcError::crc_mismatch(0x12345678, 0xDEADBEEF);
        assert!(err.to_string().contains("CRC mismatch"));

        let err = UnarcError::unsupported_format("RAR");
        assert!(err.to_string().contains("RAR"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: UnarcError = io_err.into();
        assert!(err.is_io());
        assert!(!err.is_archive_error());
    }

    #[test]
    fn test_archive_error_survives_io_round_trip() {
        let io_err: io::Error = UnarcError::crc_mismatch(1, 2).into();
        assert_eq!(io_err.kind(), io::ErrorKind::InvalidData);

        let back: UnarcError = io_err.into();
        assert!(matches!(
            back,
            UnarcError::CrcMismatch {
                expected: 1,
                computed: 2
            }
        ));
    }

    #[test]
    fn test_error_families_are_disjoint() {
        let config = UnarcError::configuration("destination must be a directory");
        assert!(config.is_configuration());
        assert!(!config.is_archive_error());
        assert!(!config.is_io());

        let archive = UnarcError::invalid_header("bad checksum");
        assert!(archive.is_archive_error());
        assert!(!archive.is_configuration());
    }
}
