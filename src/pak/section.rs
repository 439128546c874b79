//! Bounded read-only views over a seekable source.

use std::io::{self, Read, Seek, SeekFrom};

/// A read-only window `[offset, offset + len)` over an underlying reader.
///
/// Reads never cross the window end. Each view owns its source, so views
/// opened on separate handles can be read concurrently.
#[derive(Debug)]
pub struct SectionReader<R> {
    inner: R,
    base: u64,
    len: u64,
    pos: u64,
    positioned: bool,
}

impl<R: Read + Seek> SectionReader<R> {
    pub fn new(inner: R, offset: u64, len: u64) -> Self {
        Self {
            inner,
            base: offset,
            len,
            pos: 0,
            positioned: false,
        }
    }

    /// Length of the window in bytes.
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read + Seek> Read for SectionReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let remaining = self.len.saturating_sub(self.pos);
        if remaining == 0 || buf.is_empty() {
            return Ok(0);
        }
        if !self.positioned {
            self.inner.seek(SeekFrom::Start(self.base + self.pos))?;
            self.positioned = true;
        }
        let want = buf.len().min(usize::try_from(remaining).unwrap_or(usize::MAX));
        let n = self.inner.read(&mut buf[..want])?;
        self.pos += n as u64;
        Ok(n)
    }
}

impl<R: Read + Seek> Seek for SectionReader<R> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target = match pos {
            SeekFrom::Start(n) => Some(n),
            SeekFrom::End(delta) => self.len.checked_add_signed(delta),
            SeekFrom::Current(delta) => self.pos.checked_add_signed(delta),
        };
        let target = target.ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "seek before start of section")
        })?;
        self.pos = target;
        self.positioned = false;
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_reads_stop_at_window_end() {
        let data = b"0123456789".to_vec();
        let mut section = SectionReader::new(Cursor::new(data), 2, 5);
        let mut out = Vec::new();
        section.read_to_end(&mut out).unwrap();
        assert_eq!(out, b"23456");
    }

    #[test]
    fn test_seek_within_window() {
        let data = b"0123456789".to_vec();
        let mut section = SectionReader::new(Cursor::new(data), 4, 4);
        section.seek(SeekFrom::End(-1)).unwrap();
        let mut out = Vec::new();
        section.read_to_end(&mut out).unwrap();
        assert_eq!(out, b"7");
        assert!(section.seek(SeekFrom::Current(-10)).is_err());
    }

    #[test]
    fn test_empty_window() {
        let mut section = SectionReader::new(Cursor::new(vec![1u8, 2, 3]), 1, 0);
        let mut out = Vec::new();
        assert_eq!(section.read_to_end(&mut out).unwrap(), 0);
        assert!(section.is_empty());
    }
}
