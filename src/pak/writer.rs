//! Streaming PAK writer.

use std::fs::File;
use std::io::{self, BufWriter, Seek, SeekFrom, Write};
use std::path::Path;

use super::format::{DirEntry, Header, ENTRY_SIZE, HEADER_SIZE, IDENT, MAX_FILES, MAX_FILE_NAME, MAX_OFFSET};
use super::PakError;

/// Writes a PAK archive member by member.
///
/// Call [`PakWriter::start_file`] for each member, write its contents through
/// the [`Write`] impl, then [`PakWriter::close`] to emit the directory and
/// the final header.
#[derive(Debug)]
pub struct PakWriter<W: Write + Seek> {
    inner: W,
    files: Vec<DirEntry>,
    offset: u32,
    closed: bool,
}

impl PakWriter<BufWriter<File>> {
    /// Create (or truncate) the PAK file at `path`.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, PakError> {
        let file = File::create(path)?;
        Self::new(BufWriter::new(file))
    }
}

impl<W: Write + Seek> PakWriter<W> {
    /// Start writing a PAK image to `inner`, reserving room for the header.
    pub fn new(mut inner: W) -> Result<Self, PakError> {
        inner.seek(SeekFrom::Start(0))?;
        Header::default().write_to(&mut inner)?;
        Ok(Self {
            inner,
            files: Vec::new(),
            offset: HEADER_SIZE,
            closed: false,
        })
    }

    /// Begin a new member named `name`. The name is stored as given.
    pub fn start_file(&mut self, name: &str) -> Result<(), PakError> {
        if self.closed {
            return Err(PakError::AlreadyClosed);
        }
        self.finish_entry();

        if name.len() > MAX_FILE_NAME {
            return Err(PakError::NameTooLong);
        }
        if self.files.len() >= MAX_FILES {
            return Err(PakError::TooManyFiles);
        }
        self.files.push(DirEntry::new(name.as_bytes(), self.offset));
        Ok(())
    }

    /// Number of members started so far.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    fn finish_entry(&mut self) {
        if let Some(last) = self.files.last_mut() {
            last.file_len = self.offset - last.file_pos;
        }
    }

    fn write_content(&mut self, buf: &[u8]) -> Result<(), PakError> {
        if self.closed {
            return Err(PakError::AlreadyClosed);
        }
        if self.files.is_empty() {
            return Err(PakError::FileNotOpen);
        }
        let len = u32::try_from(buf.len()).map_err(|_| PakError::FileTooBig)?;
        if self.offset > MAX_OFFSET.saturating_sub(len) {
            return Err(PakError::FileTooBig);
        }
        self.inner.write_all(buf)?;
        self.offset += len;
        Ok(())
    }

    /// Write the directory and header. Fails if called twice.
    pub fn close(&mut self) -> Result<(), PakError> {
        if self.closed {
            return Err(PakError::AlreadyClosed);
        }
        self.closed = true;
        self.finish_entry();

        // count <= MAX_FILES, so this cannot overflow
        let dir_length = self.files.len() as u32 * ENTRY_SIZE;
        if self.offset > MAX_OFFSET - dir_length {
            return Err(PakError::BadDirOffset);
        }
        for entry in &self.files {
            entry.write_to(&mut self.inner)?;
        }

        self.inner.seek(SeekFrom::Start(0))?;
        let header = Header {
            ident: IDENT,
            dir_offset: self.offset,
            dir_length,
        };
        header.write_to(&mut self.inner)?;
        self.inner.flush()?;
        Ok(())
    }

    /// Close the archive and hand back the underlying writer.
    pub fn finish(mut self) -> Result<W, PakError> {
        self.close()?;
        Ok(self.inner)
    }
}

impl<W: Write + Seek> Write for PakWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_content(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pak::PakReader;
    use std::io::{Cursor, Read};

    fn roundtrip(entries: &[(String, Vec<u8>)]) {
        let mut writer = PakWriter::new(Cursor::new(Vec::new())).unwrap();
        for (name, data) in entries {
            writer.start_file(name).unwrap();
            writer.write_all(data).unwrap();
        }
        let image = writer.finish().unwrap().into_inner();

        let files = PakReader::read_directory(&mut Cursor::new(&image), image.len() as u64).unwrap();
        assert_eq!(files.len(), entries.len());
        for (file, (name, data)) in files.iter().zip(entries) {
            assert_eq!(&file.raw_name, name);
            let start = file.file_pos as usize;
            let end = start + file.file_len as usize;
            assert_eq!(&image[start..end], data.as_slice());
        }
    }

    #[test]
    fn test_roundtrip_basic() {
        roundtrip(&[
            ("foo".into(), b"test".to_vec()),
            ("bar".into(), b"junkjunkjunk".to_vec()),
            ("123qwe".into(), Vec::new()),
        ]);
    }

    #[test]
    fn test_roundtrip_embedded_zeros_and_long_name() {
        roundtrip(&[
            ("a".repeat(MAX_FILE_NAME), vec![0, 1, 0, 0, 2]),
            ("zeros".into(), vec![0; 300]),
        ]);
    }

    #[test]
    fn test_roundtrip_empty_archive() {
        roundtrip(&[]);
    }

    #[test]
    fn test_roundtrip_at_ceiling() {
        let entries: Vec<_> = (0..MAX_FILES)
            .map(|i| (format!("f{i}"), i.to_le_bytes()[..i % 3].to_vec()))
            .collect();
        roundtrip(&entries);
    }

    #[test]
    fn test_chunked_writes() {
        let mut writer = PakWriter::new(Cursor::new(Vec::new())).unwrap();
        writer.start_file("chunks").unwrap();
        writer.write_all(b"abc").unwrap();
        writer.write_all(b"def").unwrap();
        let image = writer.finish().unwrap().into_inner();

        let files = PakReader::read_directory(&mut Cursor::new(&image), image.len() as u64).unwrap();
        assert_eq!(files[0].file_len, 6);
    }

    #[test]
    fn test_name_too_long() {
        let mut writer = PakWriter::new(Cursor::new(Vec::new())).unwrap();
        let err = writer.start_file(&"x".repeat(MAX_FILE_NAME + 1)).unwrap_err();
        assert!(matches!(err, PakError::NameTooLong));
    }

    #[test]
    fn test_too_many_files() {
        let mut writer = PakWriter::new(Cursor::new(Vec::new())).unwrap();
        for i in 0..MAX_FILES {
            writer.start_file(&i.to_string()).unwrap();
        }
        assert!(matches!(writer.start_file("one-more"), Err(PakError::TooManyFiles)));
    }

    #[test]
    fn test_write_without_file() {
        let mut writer = PakWriter::new(Cursor::new(Vec::new())).unwrap();
        let err = writer.write(b"data").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert!(err.to_string().contains("file not open"));
    }

    #[test]
    fn test_close_twice() {
        let mut writer = PakWriter::new(Cursor::new(Vec::new())).unwrap();
        writer.close().unwrap();
        assert!(matches!(writer.close(), Err(PakError::AlreadyClosed)));
        assert!(matches!(writer.start_file("late"), Err(PakError::AlreadyClosed)));
    }

    #[test]
    fn test_file_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.pak");

        let mut writer = PakWriter::create(&path).unwrap();
        writer.start_file("maps/base1.bsp").unwrap();
        writer.write_all(b"IBSP").unwrap();
        writer.close().unwrap();
        drop(writer);

        let pak = PakReader::open(&path).unwrap();
        let mut contents = String::new();
        pak.open_file(&pak.files()[0]).unwrap().read_to_string(&mut contents).unwrap();
        assert_eq!(contents, "IBSP");
    }
}
