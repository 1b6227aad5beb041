#![no_main]
use libfuzzer_sys::fuzz_target;

use http_negotiate::decompress;

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }

    // Force the magic bytes to get past the quick rejection.
    let mut gz = vec![0x1f, 0x8b];
    gz.extend_from_slice(&data[2..]);
    let _ = decompress(&gz);

    let mut zlib = vec![0x78, 0x9c];
    zlib.extend_from_slice(&data[2..]);
    let _ = decompress(&zlib);
});
