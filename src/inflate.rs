//! Decompression of response bodies of guessable format.
//!
//! Servers label bodies `Content-Encoding: deflate` while sending zlib, raw
//! deflate or even gzip, and some wrap the stream in headers no standard
//! decoder accepts. [`decompress`] sniffs the first bytes and tries one
//! strategy after another until one of them decodes the whole stream.

use flate2::bufread::GzDecoder;
use flate2::{Decompress, FlushDecompress, Status};
use std::borrow::Cow;
use std::io::Read;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
const ZLIB_MAGIC: [u8; 2] = [0x78, 0x9c];
const GZIP_DEFLATE: [u8; 3] = [0x1f, 0x8b, 0x08];
const ZIP_LOCAL_HEADER: [u8; 4] = [0x50, 0x4b, 0x03, 0x04];

const GZIP_HEADER_LEN: usize = 10;
const ZIP_HEADER_LEN: usize = 30;

// gzip header flags (RFC 1952)
const FHCRC: u8 = 0x02;
const FEXTRA: u8 = 0x04;
const FNAME: u8 = 0x08;
const FCOMMENT: u8 = 0x10;

/// ZIP general purpose flag: sizes follow the data in a descriptor.
const ZIP_STREAMED: u16 = 0x08;

const OUT_CHUNK: usize = 16 * 1024;

/// Outcome of the compatibility routine.
#[derive(Debug)]
enum Compat {
    Inflated(Vec<u8>),
    /// The body is a container we don't unpack, give it back as is.
    Passthrough,
    Failed,
}

/// Decompress a gzip, zlib or raw deflate body.
///
/// Input not starting with the gzip (`1f 8b`) or zlib (`78 9c`) magic is
/// returned unchanged, as is input no strategy manages to decode. This never
/// fails, a body that can't be decompressed is simply left alone.
///
/// Strategies, first success wins:
///
/// 1. gzip
/// 2. raw deflate
/// 3. header sniffing: gzip headers, zlib headers and streamed ZIP entries are
///    skipped to reach the deflate stream
/// 4. zlib
pub fn decompress(data: &[u8]) -> Cow<'_, [u8]> {
    if data.len() < 2 || (data[..2] != GZIP_MAGIC && data[..2] != ZLIB_MAGIC) {
        trace!("Body doesn't look compressed");
        return Cow::Borrowed(data);
    }

    if let Some(v) = gunzip(data) {
        trace!("Decompressed gzip: {} -> {}", data.len(), v.len());
        return Cow::Owned(v);
    }

    if let Some(v) = inflate_raw(data) {
        trace!("Decompressed raw deflate: {} -> {}", data.len(), v.len());
        return Cow::Owned(v);
    }

    match compat_inflate(data) {
        Compat::Inflated(v) => {
            trace!("Decompressed by header sniffing: {} -> {}", data.len(), v.len());
            return Cow::Owned(v);
        }
        Compat::Passthrough => {
            debug!("Body is a ZIP container, leaving it as is");
            return Cow::Borrowed(data);
        }
        Compat::Failed => {}
    }

    if let Some(v) = inflate_zlib(data) {
        trace!("Decompressed zlib: {} -> {}", data.len(), v.len());
        return Cow::Owned(v);
    }

    debug!("All decompression strategies failed, body left as is");

    Cow::Borrowed(data)
}

/// Strip whatever wraps a deflate stream and inflate it.
///
/// * gzip headers are skipped, extra field, file name, comment and header
///   crc included, and the rest is sniffed again.
/// * a zlib header (low nibble 8, header divisible by 31) is skipped.
/// * a streamed ZIP entry is inflated from its data offset. Other ZIP entries
///   are passed through.
/// * otherwise the whole buffer is inflated, and as a last resort the
///   buffer without its first two bytes.
fn compat_inflate(data: &[u8]) -> Compat {
    if data.starts_with(&GZIP_DEFLATE) {
        if let Some(body) = skip_gzip_header(data) {
            trace!("Skipped gzip header of {} bytes", data.len() - body.len());
            // body is strictly shorter, recursion ends
            match compat_inflate(body) {
                Compat::Failed => {}
                done => return done,
            }
        }
    } else if is_zlib_header(data) {
        if let Some(v) = inflate_raw(&data[2..]) {
            return Compat::Inflated(v);
        }
        // the tail is already tried, only the whole buffer is left
        return match inflate_raw(data) {
            Some(v) => Compat::Inflated(v),
            None => Compat::Failed,
        };
    } else if data.starts_with(&ZIP_LOCAL_HEADER) {
        if data.len() < ZIP_HEADER_LEN {
            return Compat::Failed;
        }

        let flags = u16::from_le_bytes([data[6], data[7]]);
        if flags & ZIP_STREAMED == 0 {
            return Compat::Passthrough;
        }

        let name_len = u16::from_le_bytes([data[26], data[27]]) as usize;
        let extra_len = u16::from_le_bytes([data[28], data[29]]) as usize;
        let start = ZIP_HEADER_LEN + name_len + extra_len;

        if let Some(v) = data.get(start..).and_then(inflate_raw) {
            return Compat::Inflated(v);
        }
    }

    if let Some(v) = inflate_raw(data) {
        return Compat::Inflated(v);
    }

    // Some servers send a zlib header we didn't recognize.
    match data.get(2..).and_then(inflate_raw) {
        Some(v) => Compat::Inflated(v),
        None => Compat::Failed,
    }
}

/// The bytes after the gzip header, `None` if the header is truncated.
fn skip_gzip_header(data: &[u8]) -> Option<&[u8]> {
    let flags = *data.get(3)?;
    let mut pos = GZIP_HEADER_LEN;

    if flags & FEXTRA != 0 {
        let len = data.get(pos..pos + 2)?;
        let xlen = u16::from_le_bytes([len[0], len[1]]) as usize;
        pos += 2 + xlen;
    }

    if flags & FNAME != 0 {
        pos = skip_zero_terminated(data, pos)?;
    }

    if flags & FCOMMENT != 0 {
        pos = skip_zero_terminated(data, pos)?;
    }

    if flags & FHCRC != 0 {
        pos += 2;
    }

    data.get(pos..)
}

fn skip_zero_terminated(data: &[u8], pos: usize) -> Option<usize> {
    let end = data.get(pos..)?.iter().position(|b| *b == 0)?;
    Some(pos + end + 1)
}

fn is_zlib_header(data: &[u8]) -> bool {
    if data.len() < 2 {
        return false;
    }
    let cmf = data[0];
    let header = u16::from_be_bytes([data[0], data[1]]);
    cmf & 0x0f == 0x08 && header % 31 == 0
}

fn gunzip(data: &[u8]) -> Option<Vec<u8>> {
    let mut out = Vec::with_capacity(data.len() * 2);
    match GzDecoder::new(data).read_to_end(&mut out) {
        Ok(_) => Some(out),
        Err(e) => {
            trace!("gzip failed: {}", e);
            None
        }
    }
}

fn inflate_raw(data: &[u8]) -> Option<Vec<u8>> {
    inflate(data, false)
}

fn inflate_zlib(data: &[u8]) -> Option<Vec<u8>> {
    inflate(data, true)
}

/// Inflate until the end of the deflate stream. A stream that ends early or
/// is corrupt is `None`, trailing bytes after the stream are ignored.
fn inflate(data: &[u8], zlib_header: bool) -> Option<Vec<u8>> {
    let mut stream = Decompress::new(zlib_header);
    let mut out = Vec::with_capacity(data.len() * 2 + OUT_CHUNK);

    loop {
        if out.len() == out.capacity() {
            out.reserve(OUT_CHUNK);
        }

        let before_in = stream.total_in();
        let before_out = stream.total_out();
        let input = &data[before_in as usize..];

        match stream.decompress_vec(input, &mut out, FlushDecompress::None) {
            Ok(Status::StreamEnd) => return Some(out),
            Ok(_) => {
                if stream.total_in() == before_in && stream.total_out() == before_out {
                    trace!("Inflate (zlib: {}) ended before end of stream", zlib_header);
                    return None;
                }
            }
            Err(e) => {
                trace!("Inflate (zlib: {}) failed: {}", zlib_header, e);
                return None;
            }
        }
    }
}
