//! Scanned archive contents and backing stores.

use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::pak::SectionReader;

/// How an entry's bytes are stored inside its archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    Stored,
    /// Raw deflate stream, no zlib or gzip framing.
    Deflate,
}

/// Location and metadata of one archive member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Byte offset of the (possibly compressed) data in the archive file.
    pub offset: u64,
    /// Size of the data as stored.
    pub size: u64,
    pub uncompressed_size: u32,
    pub crc32: u32,
    /// Modification time, seconds since the Unix epoch.
    pub mtime: u32,
    pub compression: Compression,
}

impl ArchiveEntry {
    /// An uncompressed PAK member. PAK records carry no CRC or timestamp.
    pub fn stored(offset: u64, size: u32) -> Self {
        Self {
            offset,
            size: u64::from(size),
            uncompressed_size: size,
            crc32: 0,
            mtime: 0,
            compression: Compression::Stored,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    Pak,
    Pkz,
}

/// A fully scanned archive: backing file plus normalized-name index.
#[derive(Debug)]
pub struct Archive {
    path: PathBuf,
    kind: ArchiveKind,
    entries: HashMap<String, ArchiveEntry>,
}

impl Archive {
    pub fn new(path: PathBuf, kind: ArchiveKind, entries: HashMap<String, ArchiveEntry>) -> Self {
        Self { path, kind, entries }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> ArchiveKind {
        self.kind
    }

    /// Exact lookup by normalized name.
    pub fn get(&self, name: &str) -> Option<&ArchiveEntry> {
        self.entries.get(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Open a fresh handle on the archive file bounded to `entry`'s bytes.
    pub fn open_entry(&self, entry: &ArchiveEntry) -> std::io::Result<SectionReader<File>> {
        let file = File::open(&self.path)?;
        Ok(SectionReader::new(file, entry.offset, entry.size))
    }
}

/// One place an asset may be found, in route priority order.
#[derive(Debug, Clone)]
pub enum BackingStore {
    Archive(Arc<Archive>),
    /// Resolve by direct filesystem lookup under this root.
    Directory(Arc<Path>),
}

impl BackingStore {
    pub fn path(&self) -> &Path {
        match self {
            BackingStore::Archive(archive) => archive.path(),
            BackingStore::Directory(root) => root,
        }
    }
}

impl std::fmt::Display for BackingStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackingStore::Archive(archive) => {
                write!(f, "{} ({} files)", archive.path().display(), archive.len())
            }
            BackingStore::Directory(root) => write!(f, "{}", root.display()),
        }
    }
}
