#![no_main]
use libfuzzer_sys::fuzz_target;

use http_negotiate::{negotiate_content, negotiate_language_scored};

fuzz_target!(|data: &[u8]| {
    let s = String::from_utf8_lossy(data);

    // header first, candidates after a newline
    let mut parts = s.splitn(2, '\n');
    let header = parts.next().unwrap_or("");
    let candidates: Vec<&str> = parts.next().unwrap_or("x").split(',').collect();

    let picked = negotiate_content(Some(header), &candidates).unwrap();
    assert!(candidates.contains(&picked));

    let (picked, _) = negotiate_language_scored(Some(header), &candidates).unwrap();
    assert!(candidates.contains(&picked));
});
