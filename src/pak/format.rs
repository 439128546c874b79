//! On-disk structures and name normalization.

use std::io::{Read, Write};

use super::PakError;

/// The four ASCII bytes every PAK file starts with.
pub const IDENT: [u8; 4] = *b"PACK";

/// Size of the fixed header in bytes.
pub const HEADER_SIZE: u32 = 12;

/// Size of a single directory record in bytes.
pub const ENTRY_SIZE: u32 = 64;

/// Maximum number of files in a PAK file.
pub const MAX_FILES: usize = 4096;

/// Maximum length of a file name in a PAK file.
pub const MAX_FILE_NAME: usize = 56;

/// Maximum size of a PAK file and of everything it contains.
pub const MAX_OFFSET: u32 = (1 << 31) - 1;

/// The 12-byte archive header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Header {
    pub ident: [u8; 4],
    pub dir_offset: u32,
    pub dir_length: u32,
}

impl Header {
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self, PakError> {
        let mut buf = [0u8; HEADER_SIZE as usize];
        reader.read_exact(&mut buf)?;
        Ok(Self {
            ident: [buf[0], buf[1], buf[2], buf[3]],
            dir_offset: u32::from_le_bytes([buf[4], buf[5], buf[6], buf[7]]),
            dir_length: u32::from_le_bytes([buf[8], buf[9], buf[10], buf[11]]),
        })
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        let mut buf = [0u8; HEADER_SIZE as usize];
        buf[0..4].copy_from_slice(&self.ident);
        buf[4..8].copy_from_slice(&self.dir_offset.to_le_bytes());
        buf[8..12].copy_from_slice(&self.dir_length.to_le_bytes());
        writer.write_all(&buf)
    }
}

/// One 64-byte directory record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirEntry {
    pub name: [u8; MAX_FILE_NAME],
    pub file_pos: u32,
    pub file_len: u32,
}

impl DirEntry {
    pub fn new(name: &[u8], file_pos: u32) -> Self {
        let mut buf = [0u8; MAX_FILE_NAME];
        let n = name.len().min(MAX_FILE_NAME);
        buf[..n].copy_from_slice(&name[..n]);
        Self {
            name: buf,
            file_pos,
            file_len: 0,
        }
    }

    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self, PakError> {
        let mut buf = [0u8; ENTRY_SIZE as usize];
        reader.read_exact(&mut buf)?;
        let mut name = [0u8; MAX_FILE_NAME];
        name.copy_from_slice(&buf[..MAX_FILE_NAME]);
        Ok(Self {
            name,
            file_pos: u32::from_le_bytes([buf[56], buf[57], buf[58], buf[59]]),
            file_len: u32::from_le_bytes([buf[60], buf[61], buf[62], buf[63]]),
        })
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        let mut buf = [0u8; ENTRY_SIZE as usize];
        buf[..MAX_FILE_NAME].copy_from_slice(&self.name);
        buf[56..60].copy_from_slice(&self.file_pos.to_le_bytes());
        buf[60..64].copy_from_slice(&self.file_len.to_le_bytes());
        writer.write_all(&buf)
    }

    /// Name bytes up to the first NUL, or all 56 if there is none.
    pub fn name_bytes(&self) -> &[u8] {
        let end = self
            .name
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(MAX_FILE_NAME);
        &self.name[..end]
    }
}

/// Splits a slash-separated path into its segments with `.`, `..` and empty
/// segments resolved. `..` never climbs above the root.
pub(crate) fn clean_segments(path: &str) -> Vec<&str> {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    segments
}

/// Normalizes an archive member name: backslashes become slashes, redundant
/// segments are removed, the result is lowercased and carries no leading slash.
///
/// `A\Foo.BSP`, `a/foo.bsp` and `/a/foo.bsp` all become `a/foo.bsp`.
pub fn normalize_name(name: &str) -> String {
    let replaced = name.replace('\\', "/");
    clean_segments(&replaced).join("/").to_lowercase()
}
