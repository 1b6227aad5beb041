#![no_main]
use libfuzzer_sys::fuzz_target;

use http_negotiate::{decode_chunked, ChunkedEncoder};

fuzz_target!(|data: &[u8]| {
    // arbitrary input never panics
    let _ = decode_chunked(data);

    if data.is_empty() {
        return;
    }

    // and anything we encode decodes back
    let max = (data[0] as usize).max(1);
    let encoded = ChunkedEncoder::encode(&data[1..], max);
    let decoded = decode_chunked(&encoded);

    assert_eq!(&decoded[..], &data[1..]);
});
