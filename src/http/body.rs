//! Streaming archive bytes into response bodies.
//!
//! Bytes are produced on a blocking thread and handed to the response
//! through a small bounded channel. When the client goes away the body is
//! dropped, the channel closes, and the producer stops and releases its
//! file handle.

use std::fs::File;
use std::io::{self, Cursor, Read};

use axum::body::{Body, Bytes};
use flate2::read::DeflateDecoder;
use tokio::sync::mpsc;

use super::strategy::{gzip_header, gzip_trailer, ResponseStrategy};
use crate::archive::ArchiveEntry;
use crate::pak::SectionReader;

const CHUNK_SIZE: usize = 64 * 1024;
const CHANNEL_DEPTH: usize = 4;

/// Wrap an entry's raw section in the reader the strategy calls for.
pub fn entry_reader(
    strategy: ResponseStrategy,
    entry: &ArchiveEntry,
    section: SectionReader<File>,
) -> Box<dyn Read + Send> {
    match strategy {
        ResponseStrategy::Stored | ResponseStrategy::RawDeflate => Box::new(section),
        ResponseStrategy::Gzip => Box::new(
            Cursor::new(gzip_header(entry.mtime))
                .chain(section)
                .chain(Cursor::new(gzip_trailer(entry.crc32, entry.uncompressed_size))),
        ),
        ResponseStrategy::Inflate => Box::new(
            DeflateDecoder::new(section).take(u64::from(entry.uncompressed_size)),
        ),
    }
}

/// Stream everything `reader` yields as a response body.
///
/// A read error mid-stream is forwarded as a body error, which aborts the
/// connection instead of sending a truncated but well-formed response.
pub fn stream_body<R: Read + Send + 'static>(mut reader: R) -> Body {
    let (tx, rx) = mpsc::channel::<io::Result<Bytes>>(CHANNEL_DEPTH);

    tokio::task::spawn_blocking(move || {
        let mut buf = vec![0u8; CHUNK_SIZE];
        loop {
            let item = match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => Ok(Bytes::copy_from_slice(&buf[..n])),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => Err(e),
            };
            let failed = item.is_err();
            if tx.blocking_send(item).is_err() {
                tracing::debug!("Client disconnected, stopping transfer");
                break;
            }
            if failed {
                break;
            }
        }
    });

    let stream = futures_util::stream::unfold(rx, |mut rx| async move {
        rx.recv().await.map(|item| (item, rx))
    });
    Body::from_stream(stream)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_stream_body_collects() {
        let data: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
        let body = stream_body(Cursor::new(data.clone()));
        let collected = axum::body::to_bytes(body, usize::MAX).await.unwrap();
        assert_eq!(collected.as_ref(), data.as_slice());
    }

    #[tokio::test]
    async fn test_stream_body_error() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::InvalidData, "corrupt deflate stream"))
            }
        }
        let body = stream_body(Broken);
        assert!(axum::body::to_bytes(body, usize::MAX).await.is_err());
    }
}
