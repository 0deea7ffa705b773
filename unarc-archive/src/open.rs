//! Format dispatch.

use crate::detect::ArchiveFormat;
use crate::tar::TarHandle;
use crate::zip::ZipHandle;
use flate2::read::MultiGzDecoder;
use std::io::Read;
use tracing::debug;
use unarc_core::error::{Result, UnarcError};
use unarc_core::ArchiveHandle;

/// Open a handle over an archive byte stream.
///
/// The format is sniffed from the leading bytes, so `reader` does not need to
/// be seekable. Gzip streams are unwrapped once and must contain a TAR archive.
///
/// # Errors
///
/// [`UnarcError::UnsupportedFormat`] for RAR, 7-Zip, bare gzip payloads and
/// unrecognized data. Read failures while sniffing are passed through.
pub fn open_archive<R: Read + 'static>(reader: R) -> Result<Box<dyn ArchiveHandle>> {
    let (format, stream) = ArchiveFormat::sniff(reader)?;
    debug!(%format, "detected archive format");

    match format {
        ArchiveFormat::Zip => Ok(Box::new(ZipHandle::new(stream))),
        ArchiveFormat::Tar => Ok(Box::new(TarHandle::new(stream))),
        ArchiveFormat::Gzip => {
            let (inner, decoded) = ArchiveFormat::sniff(MultiGzDecoder::new(stream))?;
            debug!(%inner, "detected gzip payload");
            match inner {
                ArchiveFormat::Tar => Ok(Box::new(TarHandle::with_label(decoded, "TAR.GZ"))),
                _ => Err(UnarcError::unsupported_format(format.to_string())),
            }
        }
        ArchiveFormat::Rar | ArchiveFormat::SevenZip => {
            Err(UnarcError::unsupported_format(format.to_string()))
        }
        ArchiveFormat::Unknown => Err(UnarcError::unsupported_format("unknown")),
    }
}
