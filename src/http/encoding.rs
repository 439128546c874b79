//! Accept-Encoding parsing.

use axum::http::{header, HeaderMap};

/// The two content codings the engine can produce without recompressing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AcceptEncoding {
    pub gzip: bool,
    pub deflate: bool,
}

impl AcceptEncoding {
    /// Parse every `Accept-Encoding` header value.
    ///
    /// Values may be repeated and comma separated; tokens are compared case
    /// insensitively after trimming whitespace. Tokens carrying parameters
    /// (`gzip;q=0.5`) are not recognised.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let mut accepts = Self::default();
        for value in headers.get_all(header::ACCEPT_ENCODING) {
            let Ok(value) = value.to_str() else {
                continue;
            };
            for token in value.split(',') {
                let token = token.trim();
                if token.eq_ignore_ascii_case("gzip") {
                    accepts.gzip = true;
                } else if token.eq_ignore_ascii_case("deflate") {
                    accepts.deflate = true;
                }
            }
        }
        accepts
    }
}
