use http_negotiate::{decode_chunked, ChunkedEncoder, Error};
use std::borrow::Cow;
use std::io;

mod common;

#[test]
fn decode_wikipedia() {
    common::setup_logger();

    let body = decode_chunked(b"4\r\nWiki\r\n5\r\npedia\r\n0\r\n\r\n");
    assert_eq!(&body[..], b"Wikipedia");
}

#[test]
fn not_chunked_passes_through() {
    common::setup_logger();

    let data = b"not chunked data";
    let body = decode_chunked(data);
    assert!(matches!(body, Cow::Borrowed(_)));
    assert_eq!(&body[..], &data[..]);

    assert_eq!(&decode_chunked(b"")[..], b"");
    assert_eq!(&decode_chunked(b"abc")[..], b"abc");
    assert_eq!(&decode_chunked(b"deadbeef text")[..], b"deadbeef text");
}

#[test]
fn extensions_and_trailers_ignored() {
    common::setup_logger();

    let body = decode_chunked(b"4;name=value\r\nWiki\r\n5 ; x\r\npedia\r\n0\r\nExpires: never\r\n\r\n");
    assert_eq!(&body[..], b"Wikipedia");
}

#[test]
fn leading_whitespace_and_uppercase_hex() {
    common::setup_logger();

    let body = decode_chunked(b"\r\n A\r\n0123456789\r\n0\r\n\r\n");
    assert_eq!(&body[..], b"0123456789");
}

#[test]
fn missing_last_chunk() {
    common::setup_logger();

    assert_eq!(&decode_chunked(b"4\r\nWiki\r\n")[..], b"Wiki");
    assert_eq!(&decode_chunked(b"4\r\nWiki")[..], b"Wiki");
    assert_eq!(&decode_chunked(b"4\r\nWiki\r\n0")[..], b"Wiki");
}

#[test]
fn chunk_longer_than_input_passes_through() {
    common::setup_logger();

    let data = b"4\r\nWiki\r\nff\r\nshort\r\n0\r\n\r\n";
    let body = decode_chunked(data);
    assert!(matches!(body, Cow::Borrowed(_)));
    assert_eq!(&body[..], &data[..]);
}

#[test]
fn chunk_without_crlf_passes_through() {
    common::setup_logger();

    let data = b"3\r\nabcdef\r\n0\r\n\r\n";
    assert_eq!(&decode_chunked(data)[..], &data[..]);
}

#[test]
fn bad_size_line_passes_through() {
    common::setup_logger();

    let data = b"4\r\nWiki\r\nzz\r\npedia\r\n0\r\n\r\n";
    assert_eq!(&decode_chunked(data)[..], &data[..]);

    let data = b"ffffffffffffffffff\r\nx\r\n0\r\n\r\n";
    assert_eq!(&decode_chunked(data)[..], &data[..]);
}

#[test]
fn binary_payload() {
    common::setup_logger();

    let mut data = b"5\r\n".to_vec();
    data.extend_from_slice(&[0, 13, 10, 255, 48]);
    data.extend_from_slice(b"\r\n0\r\n\r\n");

    assert_eq!(&decode_chunked(&data)[..], &[0_u8, 13, 10, 255, 48][..]);
}

#[test]
fn encode_then_decode_large_body() {
    common::setup_logger();

    let text = common::lorem(100_000);
    let encoded = ChunkedEncoder::encode(&text, 11_111);

    assert!(encoded.starts_with(b"2b67\r\n"));
    assert!(encoded.ends_with(b"\r\n0\r\n\r\n"));
    assert_eq!(&decode_chunked(&encoded)[..], &text[..]);
}

#[test]
fn write_chunks() -> Result<(), Error> {
    common::setup_logger();

    let mut out = vec![];
    ChunkedEncoder::write_chunk(b"Wiki", &mut out)?;
    ChunkedEncoder::write_chunk(b"", &mut out)?;
    ChunkedEncoder::write_chunk(b"pedia in chunks", &mut out)?;
    ChunkedEncoder::write_finish(&mut out)?;

    assert_eq!(&out[..], &b"4\r\nWiki\r\nf\r\npedia in chunks\r\n0\r\n\r\n"[..]);

    Ok(())
}

struct Broken;

impl io::Write for Broken {
    fn write(&mut self, _: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "broken"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn write_error_is_io() {
    common::setup_logger();

    let err = ChunkedEncoder::write_chunk(b"data", &mut Broken).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}
