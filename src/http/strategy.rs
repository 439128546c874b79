//! Choosing how an archive entry goes on the wire.
//!
//! | stored as | client accepts   | strategy     | body                          |
//! |-----------|------------------|--------------|-------------------------------|
//! | stored    | anything         | `Stored`     | raw bytes                     |
//! | deflate   | gzip             | `Gzip`       | gzip header + raw + trailer   |
//! | deflate   | deflate, no gzip | `RawDeflate` | raw deflate, no zlib wrapper  |
//! | deflate   | neither          | `Inflate`    | decompressed on the fly       |
//!
//! Gzip wins over deflate because only its framing carries a CRC.

use crate::archive::{ArchiveEntry, Compression};

use super::encoding::AcceptEncoding;

/// Bytes added by gzip framing: 10-byte header plus 8-byte trailer.
pub const GZIP_OVERHEAD: u64 = 18;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseStrategy {
    Stored,
    Gzip,
    RawDeflate,
    Inflate,
}

impl ResponseStrategy {
    pub fn choose(compression: Compression, accepts: AcceptEncoding) -> Self {
        match compression {
            Compression::Stored => ResponseStrategy::Stored,
            Compression::Deflate if accepts.gzip => ResponseStrategy::Gzip,
            Compression::Deflate if accepts.deflate => ResponseStrategy::RawDeflate,
            Compression::Deflate => ResponseStrategy::Inflate,
        }
    }

    pub fn content_length(self, entry: &ArchiveEntry) -> u64 {
        match self {
            ResponseStrategy::Stored | ResponseStrategy::RawDeflate => entry.size,
            ResponseStrategy::Gzip => entry.size + GZIP_OVERHEAD,
            ResponseStrategy::Inflate => u64::from(entry.uncompressed_size),
        }
    }

    pub fn content_encoding(self) -> Option<&'static str> {
        match self {
            ResponseStrategy::Gzip => Some("gzip"),
            ResponseStrategy::RawDeflate => Some("deflate"),
            ResponseStrategy::Stored | ResponseStrategy::Inflate => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ResponseStrategy::Stored => "stored",
            ResponseStrategy::Gzip => "gzip",
            ResponseStrategy::RawDeflate => "deflate",
            ResponseStrategy::Inflate => "inflate",
        }
    }
}

/// Gzip member header: magic, CM=8, no flags, MTIME, XFL=0, OS=3 (Unix).
pub fn gzip_header(mtime: u32) -> [u8; 10] {
    let mut header = [0x1f, 0x8b, 8, 0, 0, 0, 0, 0, 0, 3];
    header[4..8].copy_from_slice(&mtime.to_le_bytes());
    header
}

/// Gzip trailer: CRC-32 then uncompressed size, both little-endian.
pub fn gzip_trailer(crc32: u32, size: u32) -> [u8; 8] {
    let mut trailer = [0u8; 8];
    trailer[..4].copy_from_slice(&crc32.to_le_bytes());
    trailer[4..].copy_from_slice(&size.to_le_bytes());
    trailer
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOTH: AcceptEncoding = AcceptEncoding { gzip: true, deflate: true };
    const GZIP: AcceptEncoding = AcceptEncoding { gzip: true, deflate: false };
    const DEFLATE: AcceptEncoding = AcceptEncoding { gzip: false, deflate: true };
    const NONE: AcceptEncoding = AcceptEncoding { gzip: false, deflate: false };

    fn deflated() -> ArchiveEntry {
        ArchiveEntry {
            offset: 100,
            size: 6,
            uncompressed_size: 4,
            crc32: 0xd87f_7e0c,
            mtime: 0,
            compression: Compression::Deflate,
        }
    }

    #[test]
    fn test_stored_ignores_client() {
        for accepts in [BOTH, GZIP, DEFLATE, NONE] {
            assert_eq!(ResponseStrategy::choose(Compression::Stored, accepts), ResponseStrategy::Stored);
        }
        let entry = ArchiveEntry::stored(12, 5);
        assert_eq!(ResponseStrategy::Stored.content_length(&entry), 5);
        assert_eq!(ResponseStrategy::Stored.content_encoding(), None);
    }

    #[test]
    fn test_deflate_priority() {
        assert_eq!(ResponseStrategy::choose(Compression::Deflate, BOTH), ResponseStrategy::Gzip);
        assert_eq!(ResponseStrategy::choose(Compression::Deflate, GZIP), ResponseStrategy::Gzip);
        assert_eq!(ResponseStrategy::choose(Compression::Deflate, DEFLATE), ResponseStrategy::RawDeflate);
        assert_eq!(ResponseStrategy::choose(Compression::Deflate, NONE), ResponseStrategy::Inflate);
    }

    #[test]
    fn test_lengths_and_encodings() {
        let entry = deflated();
        assert_eq!(ResponseStrategy::Gzip.content_length(&entry), 24);
        assert_eq!(ResponseStrategy::RawDeflate.content_length(&entry), 6);
        assert_eq!(ResponseStrategy::Inflate.content_length(&entry), 4);
        assert_eq!(ResponseStrategy::Gzip.content_encoding(), Some("gzip"));
        assert_eq!(ResponseStrategy::RawDeflate.content_encoding(), Some("deflate"));
        assert_eq!(ResponseStrategy::Inflate.content_encoding(), None);
    }

    #[test]
    fn test_gzip_framing() {
        assert_eq!(
            gzip_header(0x0102_0304),
            [0x1f, 0x8b, 0x08, 0x00, 0x04, 0x03, 0x02, 0x01, 0x00, 0x03]
        );
        assert_eq!(gzip_trailer(0xd87f_7e0c, 4), [0x0c, 0x7e, 0x7f, 0xd8, 4, 0, 0, 0]);
    }
}
