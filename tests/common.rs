#![allow(dead_code)]

use flate2::write::{DeflateEncoder, GzEncoder, ZlibEncoder};
use flate2::{Compression, GzBuilder};
use std::io::Write;
use std::sync::Once;

pub fn setup_logger() {
    static START: Once = Once::new();
    START.call_once(|| {
        let test_log = std::env::var("TEST_LOG")
            .map(|x| x != "0" && x.to_lowercase() != "false")
            .unwrap_or(false);
        let level = if test_log {
            log::LevelFilter::Trace
        } else {
            log::LevelFilter::Info
        };
        pretty_env_logger::formatted_builder()
            .filter_level(log::LevelFilter::Warn)
            .filter_module("http_negotiate", level)
            .target(env_logger::Target::Stdout)
            .init();
    });
}

/// Some text that compresses well, long enough to span several chunks.
pub fn lorem(len: usize) -> Vec<u8> {
    const WORDS: &[u8] = b"lorem ipsum dolor sit amet consectetur adipiscing elit ";
    WORDS.iter().cycle().take(len).cloned().collect()
}

pub fn gzip(data: &[u8]) -> Vec<u8> {
    let mut enc = GzEncoder::new(Vec::new(), Compression::default());
    enc.write_all(data).unwrap();
    enc.finish().unwrap()
}

/// gzip with file name, comment, extra field and header crc.
pub fn gzip_with_header(data: &[u8]) -> Vec<u8> {
    let mut enc = GzBuilder::new()
        .filename("body.txt")
        .comment("made in a test")
        .extra(vec![1, 2, 3, 4])
        .write(Vec::new(), Compression::default());
    enc.write_all(data).unwrap();
    enc.finish().unwrap()
}

pub fn zlib(data: &[u8]) -> Vec<u8> {
    let mut enc = ZlibEncoder::new(Vec::new(), Compression::default());
    enc.write_all(data).unwrap();
    enc.finish().unwrap()
}

pub fn deflate(data: &[u8]) -> Vec<u8> {
    let mut enc = DeflateEncoder::new(Vec::new(), Compression::default());
    enc.write_all(data).unwrap();
    enc.finish().unwrap()
}
