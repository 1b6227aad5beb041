use crate::chunked::decode_chunked;
use crate::http11::parse_response;
use crate::inflate::decompress;
use crate::Error;
use std::borrow::Cow;
use std::fmt;

/// How a response body is decoded, configured by the response headers.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum BodyDecoding {
    /// Nothing to undo.
    Identity,
    /// Decompress.
    Compressed,
    /// Undo the chunked transfer-coding.
    Chunked,
    /// Undo the chunked transfer-coding, then decompress.
    ChunkedCompressed,
}

impl BodyDecoding {
    /// Create an instance from response headers.
    ///
    /// 1. If header `transfer-encoding` has any other value than `identity`,
    ///    undo chunking.
    /// 2. If header `content-encoding` is `gzip`, `x-gzip` or `deflate`,
    ///    decompress.
    pub fn from_headers(headers: &http::HeaderMap<http::HeaderValue>) -> Self {
        let ret = match (is_chunked(headers), is_compressed(headers)) {
            (false, false) => BodyDecoding::Identity,
            (false, true) => BodyDecoding::Compressed,
            (true, false) => BodyDecoding::Chunked,
            (true, true) => BodyDecoding::ChunkedCompressed,
        };

        trace!("BodyDecoding from headers: {:?}", ret);

        ret
    }

    fn is_chunked(&self) -> bool {
        matches!(self, BodyDecoding::Chunked | BodyDecoding::ChunkedCompressed)
    }

    fn is_compressed(&self) -> bool {
        matches!(self, BodyDecoding::Compressed | BodyDecoding::ChunkedCompressed)
    }

    /// Decode a complete body. Chunking is undone before decompressing.
    pub fn decode<'a>(&self, body: &'a [u8]) -> Cow<'a, [u8]> {
        let unchunked = if self.is_chunked() {
            decode_chunked(body)
        } else {
            Cow::Borrowed(body)
        };

        if !self.is_compressed() {
            return unchunked;
        }

        match unchunked {
            Cow::Borrowed(b) => decompress(b),
            Cow::Owned(v) => {
                let decompressed = match decompress(&v) {
                    Cow::Owned(d) => Some(d),
                    Cow::Borrowed(_) => None,
                };
                Cow::Owned(decompressed.unwrap_or(v))
            }
        }
    }
}

impl fmt::Debug for BodyDecoding {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BodyDecoding::Identity => write!(f, "Identity"),
            BodyDecoding::Compressed => write!(f, "Compressed"),
            BodyDecoding::Chunked => write!(f, "Chunked"),
            BodyDecoding::ChunkedCompressed => write!(f, "ChunkedCompressed"),
        }
    }
}

/// Decode a complete response body according to its headers.
pub fn decode_body<'a>(headers: &http::HeaderMap, body: &'a [u8]) -> Cow<'a, [u8]> {
    BodyDecoding::from_headers(headers).decode(body)
}

/// Parse a buffered raw response and decode its body.
///
/// Returns `Ok(None)` if the head isn't complete. Everything after the head is
/// taken to be the body.
pub fn decode_response(raw: &[u8]) -> Result<Option<http::Response<Vec<u8>>>, Error> {
    let (parts, len) = match parse_response(raw)? {
        Some(v) => v,
        None => return Ok(None),
    };

    let body = decode_body(&parts.headers, &raw[len..]).into_owned();

    Ok(Some(http::Response::from_parts(parts, body)))
}

fn is_chunked(headers: &http::HeaderMap<http::HeaderValue>) -> bool {
    get_str(headers, "transfer-encoding")
        // https://tools.ietf.org/html/rfc2616#section-4.4
        //
        // If a Transfer-Encoding header field (section 14.41) is present and
        // has any value other than "identity", then the transfer-length is
        // defined by use of the "chunked" transfer-coding
        .map(|h| !h.contains("identity"))
        .unwrap_or(false)
}

fn is_compressed(headers: &http::HeaderMap<http::HeaderValue>) -> bool {
    get_str(headers, "content-encoding")
        .map(|h| {
            h.split(',')
                .map(|c| c.trim().to_ascii_lowercase())
                .any(|c| c == "gzip" || c == "x-gzip" || c == "deflate")
        })
        .unwrap_or(false)
}

fn get_str<'a>(headers: &'a http::HeaderMap, key: &str) -> Option<&'a str> {
    headers.get(key).and_then(|v| v.to_str().ok())
}
