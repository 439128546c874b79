//! Directory scanner producing ordered backing stores.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use super::entry::{Archive, ArchiveEntry, ArchiveKind, BackingStore};
use super::order::{is_archive_name, sort_archive_names};
use crate::pak::{PakError, PakReader};

/// Errors raised while scanning search directories.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The directory itself could not be listed. Fatal.
    #[error("failed to list directory {}: {source}", path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Pak(#[from] PakError),

    #[error("pkz: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("entry {name} lies outside the archive")]
    EntryOutOfBounds { name: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ScanError {
    /// Fatal errors abort a build; the rest only drop a single archive.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ScanError::ReadDir { .. })
    }
}

/// Scans search directories into backing store lists.
///
/// Holds the per-build directory cache: scanning the same directory twice
/// through one scanner returns the first result without touching the disk.
/// A reload creates a fresh scanner.
#[derive(Debug, Default)]
pub struct ArchiveScanner {
    directory_rules: bool,
    cache: HashMap<PathBuf, Arc<[BackingStore]>>,
}

impl ArchiveScanner {
    /// `directory_rules` is true when at least one directory access pattern
    /// is configured; only then do directories get a raw lookup sentinel.
    pub fn new(directory_rules: bool) -> Self {
        Self {
            directory_rules,
            cache: HashMap::new(),
        }
    }

    /// Backing stores for one search directory, archives first in priority
    /// order, followed by the directory sentinel when enabled.
    pub fn scan_directory(&mut self, dir: &Path) -> Result<Arc<[BackingStore]>, ScanError> {
        if let Some(stores) = self.cache.get(dir) {
            tracing::debug!(directory = %dir.display(), "Directory scan cache hit");
            return Ok(Arc::clone(stores));
        }

        let names = list_archives(dir)?;
        let mut stores = Vec::with_capacity(names.len() + 1);
        for name in names {
            let path = dir.join(&name);
            match scan_archive(&path) {
                Ok(archive) => {
                    tracing::debug!(archive = %path.display(), files = archive.len(), "Archive scanned");
                    stores.push(BackingStore::Archive(Arc::new(archive)));
                }
                Err(e) => {
                    tracing::error!(archive = %path.display(), error = %e, "Failed to scan archive");
                }
            }
        }

        if self.directory_rules {
            stores.push(BackingStore::Directory(Arc::from(dir)));
        } else if stores.is_empty() {
            tracing::warn!(
                directory = %dir.display(),
                "Directory ignored: no usable archives and no directory access rules"
            );
        }

        let stores: Arc<[BackingStore]> = stores.into();
        self.cache.insert(dir.to_path_buf(), Arc::clone(&stores));
        Ok(stores)
    }

    /// Number of distinct directories scanned so far.
    pub fn cached_directories(&self) -> usize {
        self.cache.len()
    }
}

/// Archive file names in `dir`, sorted by priority.
fn list_archives(dir: &Path) -> Result<Vec<String>, ScanError> {
    let read_dir_error = |source| ScanError::ReadDir {
        path: dir.to_path_buf(),
        source,
    };

    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(read_dir_error)? {
        let entry = entry.map_err(read_dir_error)?;
        let Ok(name) = entry.file_name().into_string() else {
            tracing::warn!(directory = %dir.display(), name = ?entry.file_name(), "Skipping non UTF-8 file name");
            continue;
        };
        if is_archive_name(&name) {
            names.push(name);
        }
    }
    sort_archive_names(&mut names);
    Ok(names)
}

/// Fully scan one archive, choosing the reader by extension.
pub fn scan_archive(path: &Path) -> Result<Archive, ScanError> {
    let is_pkz = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pkz"));
    if is_pkz {
        super::zip::scan_pkz(path)
    } else {
        scan_pak(path)
    }
}

fn scan_pak(path: &Path) -> Result<Archive, ScanError> {
    let pak = PakReader::open(path)?;
    let mut entries = HashMap::with_capacity(pak.files().len());
    for file in pak.files() {
        // later records shadow earlier ones with the same name
        entries.insert(
            file.name.clone(),
            ArchiveEntry::stored(u64::from(file.file_pos), file.file_len),
        );
    }
    Ok(Archive::new(path.to_path_buf(), ArchiveKind::Pak, entries))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pak::PakWriter;
    use std::io::Write;

    fn write_pak(path: &Path, entries: &[(&str, &[u8])]) {
        let mut writer = PakWriter::create(path).unwrap();
        for (name, data) in entries {
            writer.start_file(name).unwrap();
            writer.write_all(data).unwrap();
        }
        writer.close().unwrap();
    }

    fn store_names(stores: &[BackingStore]) -> Vec<String> {
        stores
            .iter()
            .map(|s| s.path().file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_scan_order() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["custom.pak", "pak2.pak", "pak0.pak"] {
            write_pak(&dir.path().join(name), &[("a", b"x")]);
        }
        std::fs::write(dir.path().join("readme.txt"), b"not an archive").unwrap();

        let mut scanner = ArchiveScanner::new(false);
        let stores = scanner.scan_directory(dir.path()).unwrap();
        assert_eq!(store_names(&stores), ["pak0.pak", "pak2.pak", "custom.pak"]);
    }

    #[test]
    fn test_bad_archive_skipped() {
        let dir = tempfile::tempdir().unwrap();
        write_pak(&dir.path().join("pak0.pak"), &[("a", b"x")]);
        std::fs::write(dir.path().join("pak1.pak"), b"JUNKJUNKJUNKJUNK").unwrap();
        write_pak(&dir.path().join("pak2.pak"), &[("b", b"y")]);

        let mut scanner = ArchiveScanner::new(false);
        let stores = scanner.scan_directory(dir.path()).unwrap();
        assert_eq!(store_names(&stores), ["pak0.pak", "pak2.pak"]);
    }

    #[test]
    fn test_directory_sentinel() {
        let dir = tempfile::tempdir().unwrap();
        write_pak(&dir.path().join("pak0.pak"), &[("a", b"x")]);

        let mut scanner = ArchiveScanner::new(true);
        let stores = scanner.scan_directory(dir.path()).unwrap();
        assert_eq!(stores.len(), 2);
        assert!(matches!(stores[0], BackingStore::Archive(_)));
        assert!(matches!(&stores[1], BackingStore::Directory(root) if **root == *dir.path()));
    }

    #[test]
    fn test_empty_directory_contributes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut scanner = ArchiveScanner::new(false);
        assert!(scanner.scan_directory(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_names_last_wins() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pak0.pak");
        write_pak(&path, &[("Dup.txt", b"first"), ("dup.txt", b"second!")]);

        let archive = scan_archive(&path).unwrap();
        assert_eq!(archive.len(), 1);
        assert_eq!(archive.get("dup.txt").unwrap().size, 7);
    }

    #[test]
    fn test_cache_hit_skips_filesystem() {
        let dir = tempfile::tempdir().unwrap();
        write_pak(&dir.path().join("pak0.pak"), &[("a", b"x")]);

        let mut scanner = ArchiveScanner::new(false);
        let first = scanner.scan_directory(dir.path()).unwrap();
        write_pak(&dir.path().join("pak1.pak"), &[("b", b"y")]);
        let second = scanner.scan_directory(dir.path()).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(scanner.cached_directories(), 1);

        let mut fresh = ArchiveScanner::new(false);
        assert_eq!(fresh.scan_directory(dir.path()).unwrap().len(), 2);
    }

    #[test]
    fn test_missing_directory_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let mut scanner = ArchiveScanner::new(true);
        let err = scanner.scan_directory(&dir.path().join("nope")).unwrap_err();
        assert!(err.is_fatal());
    }
}
