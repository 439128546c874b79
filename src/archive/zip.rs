//! PKZ (ZIP) directory scanning.

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use time::{Date, Month, PrimitiveDateTime, Time};
use zip::{CompressionMethod, ZipArchive};

use super::entry::{Archive, ArchiveEntry, ArchiveKind, Compression};
use super::scanner::ScanError;
use crate::pak::normalize_name;

/// Sizes at or above this value mean "unknown or too large" in a 32-bit
/// ZIP header and cannot be served.
const SIZE_SENTINEL: u64 = 0xFFFF_FFFF;

/// Scan the central directory of the ZIP file at `path`.
///
/// Directory members are skipped. Members with a size sentinel or a
/// compression method other than stored/deflate are skipped with a warning.
pub fn scan_pkz(path: &Path) -> Result<Archive, ScanError> {
    let file = File::open(path)?;
    let file_size = file.metadata()?.len();
    let mut zip = ZipArchive::new(BufReader::new(file))?;

    let mut entries = HashMap::with_capacity(zip.len());
    for index in 0..zip.len() {
        let member = zip.by_index_raw(index)?;
        if member.is_dir() {
            continue;
        }

        let compression = match member.compression() {
            CompressionMethod::Stored => Compression::Stored,
            CompressionMethod::Deflated => Compression::Deflate,
            other => {
                tracing::warn!(
                    archive = %path.display(),
                    member = member.name(),
                    method = ?other,
                    "Skipping member with unsupported compression"
                );
                continue;
            }
        };

        if member.compressed_size() >= SIZE_SENTINEL || member.size() >= SIZE_SENTINEL {
            tracing::warn!(
                archive = %path.display(),
                member = member.name(),
                "Skipping member with unknown or oversized length"
            );
            continue;
        }

        let offset = member.data_start();
        let size = member.compressed_size();
        if offset.saturating_add(size) > file_size {
            return Err(ScanError::EntryOutOfBounds {
                name: member.name().to_string(),
            });
        }

        entries.insert(
            normalize_name(member.name()),
            ArchiveEntry {
                offset,
                size,
                uncompressed_size: member.size() as u32,
                crc32: member.crc32(),
                mtime: member.last_modified().and_then(unix_mtime).unwrap_or(0),
                compression,
            },
        );
    }

    Ok(Archive::new(path.to_path_buf(), ArchiveKind::Pkz, entries))
}

/// DOS date/time (taken as UTC) to Unix seconds.
fn unix_mtime(dt: zip::DateTime) -> Option<u32> {
    let month = Month::try_from(dt.month()).ok()?;
    let date = Date::from_calendar_date(i32::from(dt.year()), month, dt.day()).ok()?;
    let time = Time::from_hms(dt.hour(), dt.minute(), dt.second()).ok()?;
    let seconds = PrimitiveDateTime::new(date, time).assume_utc().unix_timestamp();
    u32::try_from(seconds).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn write_zip(path: &Path) {
        let file = File::create(path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        let stored = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Stored)
            .last_modified_time(zip::DateTime::from_date_and_time(2001, 2, 3, 4, 5, 6).unwrap());
        let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        zip.add_directory("Maps/", stored).unwrap();
        zip.start_file("Maps/Q2DM1.BSP", stored).unwrap();
        zip.write_all(b"IBSP").unwrap();
        zip.start_file("players\\male\\tris.md2", deflated).unwrap();
        zip.write_all(&[b'a'; 1000]).unwrap();
        zip.finish().unwrap();
    }

    #[test]
    fn test_scan_pkz() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pak9.pkz");
        write_zip(&path);

        let archive = scan_pkz(&path).unwrap();
        assert_eq!(archive.len(), 2);
        assert_eq!(archive.kind(), ArchiveKind::Pkz);

        let stored = archive.get("maps/q2dm1.bsp").unwrap();
        assert_eq!(stored.compression, Compression::Stored);
        assert_eq!(stored.size, 4);
        assert_eq!(stored.uncompressed_size, 4);
        assert_eq!(stored.mtime, 981_173_106);

        let deflated = archive.get("players/male/tris.md2").unwrap();
        assert_eq!(deflated.compression, Compression::Deflate);
        assert_eq!(deflated.uncompressed_size, 1000);
        assert!(deflated.size < 1000);

        let bytes = std::fs::read(&path).unwrap();
        let start = stored.offset as usize;
        assert_eq!(&bytes[start..start + 4], b"IBSP");
    }

    #[test]
    fn test_not_a_zip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("junk.pkz");
        std::fs::write(&path, b"definitely not a zip archive").unwrap();
        assert!(matches!(scan_pkz(&path), Err(ScanError::Zip(_))));
    }
}
