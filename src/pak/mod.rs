//! PAK archive codec.
//!
//! # Layout
//! ```text
//! offset 0      header   { ident "PACK", dir_offset: u32, dir_length: u32 }   (12 bytes, LE)
//! offset 12     file contents, back to back
//! dir_offset    directory: dir_length / 64 records of
//!               { name: [u8; 56] (NUL padded), file_pos: u32, file_len: u32 }
//! ```
//!
//! # Design Decisions
//! - Every offset and length is validated against `MAX_OFFSET` and the real
//!   file size; a single bad record rejects the whole archive
//! - Entry contents are exposed as independent bounded views, each with its
//!   own file handle, so concurrent readers never share a cursor
//! - The writer streams contents and emits the directory on close; archives
//!   are always rebuilt wholesale

pub mod format;
pub mod reader;
pub mod section;
pub mod writer;

pub use format::{normalize_name, MAX_FILES, MAX_FILE_NAME, MAX_OFFSET};
pub use reader::{PakFile, PakReader};
pub use section::SectionReader;
pub use writer::PakWriter;

use thiserror::Error;

/// Errors produced while reading or writing PAK archives.
#[derive(Debug, Error)]
pub enum PakError {
    #[error("pak: bad ident")]
    BadIdent,

    #[error("pak: bad directory length")]
    BadDirLength,

    #[error("pak: bad directory offset")]
    BadDirOffset,

    #[error("pak: bad file length")]
    BadFileLength,

    #[error("pak: bad file position")]
    BadFilePosition,

    #[error("pak: too many files")]
    TooManyFiles,

    #[error("pak: file name too long")]
    NameTooLong,

    #[error("pak: already closed")]
    AlreadyClosed,

    #[error("pak: file not open")]
    FileNotOpen,

    #[error("pak: file too big")]
    FileTooBig,

    #[error("pak: {0}")]
    Io(#[from] std::io::Error),
}

impl PakError {
    /// True for errors caused by archive contents rather than the I/O layer.
    pub fn is_format_error(&self) -> bool {
        !matches!(self, PakError::Io(_))
    }
}

impl From<PakError> for std::io::Error {
    fn from(err: PakError) -> Self {
        match err {
            PakError::Io(e) => e,
            other => std::io::Error::new(std::io::ErrorKind::InvalidData, other),
        }
    }
}
