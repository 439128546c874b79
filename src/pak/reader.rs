//! PAK directory reader.

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use super::format::{normalize_name, DirEntry, Header, ENTRY_SIZE, IDENT, MAX_FILES, MAX_OFFSET};
use super::section::SectionReader;
use super::PakError;

/// A single member of a PAK archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PakFile {
    /// Normalized lookup name (lowercase, forward slashes, no leading slash).
    pub name: String,
    /// Name exactly as stored in the directory record.
    pub raw_name: String,
    pub file_pos: u32,
    pub file_len: u32,
}

/// A parsed PAK archive backed by a file on disk.
#[derive(Debug, Clone)]
pub struct PakReader {
    path: PathBuf,
    files: Vec<PakFile>,
}

impl PakReader {
    /// Open the PAK file at `path` and read its directory.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PakError> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let size = file.metadata()?.len();
        let mut reader = BufReader::new(file);
        let files = Self::read_directory(&mut reader, size)?;
        Ok(Self {
            path: path.to_path_buf(),
            files,
        })
    }

    /// Parse the header and directory of a PAK image of `size` bytes.
    ///
    /// Fails with a format error on a bad ident, a directory length that is
    /// not a multiple of 64, more than `MAX_FILES` records, or any offset or
    /// length that reaches past `MAX_OFFSET` or past the end of the image.
    pub fn read_directory<R: Read + Seek>(reader: &mut R, size: u64) -> Result<Vec<PakFile>, PakError> {
        reader.seek(SeekFrom::Start(0))?;
        let header = Header::read_from(reader)?;
        if header.ident != IDENT {
            return Err(PakError::BadIdent);
        }
        if header.dir_length % ENTRY_SIZE != 0 {
            return Err(PakError::BadDirLength);
        }
        let count = (header.dir_length / ENTRY_SIZE) as usize;
        if count > MAX_FILES {
            return Err(PakError::TooManyFiles);
        }
        if header.dir_offset > MAX_OFFSET - header.dir_length
            || u64::from(header.dir_offset) + u64::from(header.dir_length) > size
        {
            return Err(PakError::BadDirOffset);
        }

        reader.seek(SeekFrom::Start(u64::from(header.dir_offset)))?;
        let mut files = Vec::with_capacity(count);
        for _ in 0..count {
            let entry = DirEntry::read_from(reader)?;
            if entry.file_len > MAX_OFFSET {
                return Err(PakError::BadFileLength);
            }
            if entry.file_pos > MAX_OFFSET - entry.file_len
                || u64::from(entry.file_pos) + u64::from(entry.file_len) > size
            {
                return Err(PakError::BadFilePosition);
            }
            let raw_name = String::from_utf8_lossy(entry.name_bytes()).into_owned();
            files.push(PakFile {
                name: normalize_name(&raw_name),
                raw_name,
                file_pos: entry.file_pos,
                file_len: entry.file_len,
            });
        }
        Ok(files)
    }

    /// Directory records in on-disk order.
    pub fn files(&self) -> &[PakFile] {
        &self.files
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open an independent bounded view over one member's contents.
    ///
    /// Every call opens its own handle on the archive file.
    pub fn open_file(&self, file: &PakFile) -> std::io::Result<SectionReader<File>> {
        let handle = File::open(&self.path)?;
        Ok(SectionReader::new(
            handle,
            u64::from(file.file_pos),
            u64::from(file.file_len),
        ))
    }
}
