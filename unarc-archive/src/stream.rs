//! Forward-only stream helpers shared by the streaming handles.

use std::io::{self, BufRead, Read};
use unarc_core::error::{Result, UnarcError};

/// A `BufRead` view over the bytes of the current entry.
///
/// With a limit, reading stops after that many bytes and a source that ends
/// early is reported as truncated. The counter lives in the handle, so
/// progress survives the reader being dropped half way through an entry.
/// Without a limit the view passes everything through; the decoder on top
/// is then responsible for finding the end.
pub(crate) struct Bounded<'a, B> {
    inner: &'a mut B,
    remaining: Option<&'a mut u64>,
}

impl<'a, B: BufRead> Bounded<'a, B> {
    pub(crate) fn new(inner: &'a mut B, remaining: Option<&'a mut u64>) -> Self {
        Self { inner, remaining }
    }
}

impl<B: BufRead> Read for Bounded<'_, B> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let available = self.fill_buf()?;
        let n = available.len().min(buf.len());
        buf[..n].copy_from_slice(&available[..n]);
        self.consume(n);
        Ok(n)
    }
}

impl<B: BufRead> BufRead for Bounded<'_, B> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        let Some(remaining) = self.remaining.as_deref().copied() else {
            return self.inner.fill_buf();
        };
        if remaining == 0 {
            return Ok(&[]);
        }
        let buf = self.inner.fill_buf()?;
        if buf.is_empty() {
            return Err(UnarcError::unexpected_eof(remaining).into());
        }
        let n = (buf.len() as u64).min(remaining) as usize;
        Ok(&buf[..n])
    }

    fn consume(&mut self, amt: usize) {
        self.inner.consume(amt);
        if let Some(remaining) = self.remaining.as_deref_mut() {
            *remaining = remaining.saturating_sub(amt as u64);
        }
    }
}

/// Discard exactly `count` bytes.
pub(crate) fn skip<R: Read>(reader: &mut R, count: u64) -> Result<()> {
    if count == 0 {
        return Ok(());
    }
    let copied = io::copy(&mut reader.take(count), &mut io::sink())?;
    if copied < count {
        return Err(UnarcError::unexpected_eof(count - copied));
    }
    Ok(())
}

/// Read up to `buf.len()` bytes, stopping early only at end of stream.
pub(crate) fn fill<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(filled)
}

/// Fill `buf` completely.
///
/// Returns `false` when the stream ended cleanly before the first byte.
/// A stream that ends part way through `buf` is an error.
pub(crate) fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<bool> {
    let filled = fill(reader, buf)?;
    if filled == 0 {
        Ok(false)
    } else if filled < buf.len() {
        Err(UnarcError::unexpected_eof((buf.len() - filled) as u64))
    } else {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufReader, Cursor};

    #[test]
    fn test_bounded_stops_at_limit() {
        let mut inner = BufReader::new(Cursor::new(b"abcdef".to_vec()));
        let mut remaining = 4;
        let mut out = Vec::new();
        Bounded::new(&mut inner, Some(&mut remaining))
            .read_to_end(&mut out)
            .unwrap();
        assert_eq!(out, b"abcd");
        assert_eq!(remaining, 0);

        let mut rest = Vec::new();
        inner.read_to_end(&mut rest).unwrap();
        assert_eq!(rest, b"ef");
    }

    #[test]
    fn test_bounded_tracks_partial_reads() {
        let mut inner = BufReader::new(Cursor::new(b"abcdef".to_vec()));
        let mut remaining = 5;
        {
            let mut bounded = Bounded::new(&mut inner, Some(&mut remaining));
            let mut two = [0u8; 2];
            bounded.read_exact(&mut two).unwrap();
        }
        assert_eq!(remaining, 3);
    }

    #[test]
    fn test_bounded_reports_truncation() {
        let mut inner = BufReader::new(Cursor::new(b"abc".to_vec()));
        let mut remaining = 8;
        let mut out = Vec::new();
        let err = Bounded::new(&mut inner, Some(&mut remaining))
            .read_to_end(&mut out)
            .unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
        assert_eq!(out, b"abc");
    }

    #[test]
    fn test_unbounded_passes_through() {
        let mut inner = BufReader::new(Cursor::new(b"abc".to_vec()));
        let mut out = Vec::new();
        Bounded::new(&mut inner, None).read_to_end(&mut out).unwrap();
        assert_eq!(out, b"abc");
    }

    #[test]
    fn test_skip_reports_short_stream() {
        let mut reader = Cursor::new(vec![0u8; 10]);
        assert!(skip(&mut reader, 10).is_ok());

        let mut reader = Cursor::new(vec![0u8; 10]);
        let err = skip(&mut reader, 16).unwrap_err();
        assert!(matches!(err, UnarcError::UnexpectedEof { expected: 6 }));
    }

    #[test]
    fn test_read_full_distinguishes_clean_end() {
        let mut buf = [0u8; 4];
        assert!(!read_full(&mut Cursor::new(Vec::new()), &mut buf).unwrap());
        assert!(read_full(&mut Cursor::new(vec![1, 2, 3, 4]), &mut buf).unwrap());
        assert!(read_full(&mut Cursor::new(vec![1, 2]), &mut buf).is_err());
    }
}
