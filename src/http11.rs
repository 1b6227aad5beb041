use crate::Error;
use http::header::{HeaderName, HeaderValue};

// Response heads vary from a couple of hundred bytes to a few KB, 128
// headers is plenty.
const MAX_HEADERS: usize = 128;

fn version_of(v: Option<u8>) -> http::Version {
    match v {
        Some(0) => http::Version::HTTP_10,
        _ => http::Version::HTTP_11,
    }
}

/// Attempt to parse the head of a buffered http/1.x response.
///
/// Returns `Ok(None)` if the buffer doesn't yet hold a complete head, otherwise
/// the response parts and the length of the head. The body starts right after.
///
/// Header names or values the `http` crate refuses are dropped.
pub fn parse_response(buf: &[u8]) -> Result<Option<(http::response::Parts, usize)>, Error> {
    trace!("parse_response: {:?}", String::from_utf8_lossy(buf));

    let mut headers = [httparse::EMPTY_HEADER; MAX_HEADERS];
    let mut parser = httparse::Response::new(&mut headers);

    let status = parser.parse(buf)?;

    let len = match status {
        httparse::Status::Complete(len) => len,
        httparse::Status::Partial => return Ok(None),
    };

    let mut bld = http::Response::builder().version(version_of(parser.version));

    if let Some(code) = parser.code {
        bld = bld.status(code);
    }

    for head in parser.headers.iter() {
        let name = HeaderName::from_bytes(head.name.as_bytes());
        let value = HeaderValue::from_bytes(head.value);
        match (name, value) {
            (Ok(name), Ok(value)) => bld = bld.header(name, value),
            (Err(e), _) => {
                debug!("Dropping bad header name: {}", e);
            }
            (Ok(name), Err(e)) => {
                debug!("Dropping bad header value ({}): {}", name, e);
            }
        }
    }

    let (parts, _) = bld.body(())?.into_parts();

    debug!("parse_response success: {:?}", parts);

    Ok(Some((parts, len)))
}
