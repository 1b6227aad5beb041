//! `Transfer-Encoding: chunked`, RFC 2616 §3.6.1.
//!
//! Decoding works on a complete body held in memory. Anything that doesn't
//! look like a well formed chunked body is handed back untouched, so the
//! decoder can be applied to bodies whose framing isn't known for sure.

use crate::Error;
use std::borrow::Cow;
use std::convert::TryFrom;
use std::io::Write;

const CRLF: &[u8] = b"\r\n";

/// Decode a chunked body.
///
/// Chunk extensions and trailer headers are ignored. Malformed input, such
/// as a chunk size line that doesn't parse, a chunk declaring more bytes than
/// there are left, or a chunk missing its trailing CRLF, gives back the
/// original input.
///
/// ```
/// let body = http_negotiate::decode_chunked(b"4\r\nWiki\r\n5\r\npedia\r\n0\r\n\r\n");
/// assert_eq!(&body[..], b"Wikipedia");
/// ```
pub fn decode_chunked(data: &[u8]) -> Cow<'_, [u8]> {
    match try_decode(data) {
        Some(decoded) => Cow::Owned(decoded),
        None => Cow::Borrowed(data),
    }
}

fn try_decode(data: &[u8]) -> Option<Vec<u8>> {
    let mut rest = trim_start(data);

    if !rest.first().map_or(false, u8::is_ascii_hexdigit) {
        trace!("Not a chunked body");
        return None;
    }

    let mut out = Vec::with_capacity(rest.len());

    loop {
        let (header_len, size) = match read_chunk_size(rest) {
            Some(v) => v,
            None => {
                debug!("Bad chunk size line, passing body through");
                return None;
            }
        };

        trace!("Chunk size: {}", size);

        if size == 0 {
            // trailer headers, if any, are dropped
            return Some(out);
        }

        let chunk = &rest[header_len..];

        if chunk.len() < size {
            debug!(
                "Chunk size {} larger than remaining {} bytes, passing body through",
                size,
                chunk.len()
            );
            return None;
        }

        out.extend_from_slice(&chunk[..size]);

        rest = &chunk[size..];

        if !rest.is_empty() {
            if !rest.starts_with(CRLF) {
                debug!("Chunk not followed by CRLF, passing body through");
                return None;
            }
            rest = &rest[CRLF.len()..];
        }

        let remaining = trim(rest);
        if remaining.is_empty() || remaining == b"0" {
            return Some(out);
        }
    }
}

/// Parse `<hex>[;ext]\r\n` into (length of line, chunk size).
fn read_chunk_size(buf: &[u8]) -> Option<(usize, usize)> {
    // httparse accepts an empty size as 0, we don't.
    if !buf.first().map_or(false, u8::is_ascii_hexdigit) {
        return None;
    }

    match httparse::parse_chunk_size(buf) {
        Ok(httparse::Status::Complete((len, size))) => {
            let size = usize::try_from(size).ok()?;
            Some((len, size))
        }
        Ok(httparse::Status::Partial) => None,
        Err(_) => None,
    }
}

fn trim_start(mut buf: &[u8]) -> &[u8] {
    while let Some((first, rest)) = buf.split_first() {
        if !first.is_ascii_whitespace() {
            break;
        }
        buf = rest;
    }
    buf
}

fn trim(buf: &[u8]) -> &[u8] {
    let mut buf = trim_start(buf);
    while let Some((last, rest)) = buf.split_last() {
        if !last.is_ascii_whitespace() {
            break;
        }
        buf = rest;
    }
    buf
}

/// Writes chunked framing.
#[derive(Debug)]
pub struct ChunkedEncoder;

impl ChunkedEncoder {
    /// Write one chunk. Empty data writes nothing, since an empty chunk would
    /// end the body.
    #[allow(clippy::write_with_newline)]
    pub fn write_chunk<W: Write>(data: &[u8], out: &mut W) -> Result<(), Error> {
        if data.is_empty() {
            return Ok(());
        }

        write!(out, "{:x}\r\n", data.len())?;
        out.write_all(data)?;
        out.write_all(CRLF)?;

        Ok(())
    }

    /// Write the terminating zero sized chunk.
    pub fn write_finish<W: Write>(out: &mut W) -> Result<(), Error> {
        out.write_all(b"0\r\n\r\n")?;
        Ok(())
    }

    /// Encode a whole body in chunks of at most `max` bytes.
    pub fn encode(data: &[u8], max: usize) -> Vec<u8> {
        let mut out = Vec::with_capacity(data.len() + 32);
        for chunk in data.chunks(max.max(1)) {
            out.extend_from_slice(format!("{:x}\r\n", chunk.len()).as_bytes());
            out.extend_from_slice(chunk);
            out.extend_from_slice(CRLF);
        }
        out.extend_from_slice(b"0\r\n\r\n");
        out
    }
}
