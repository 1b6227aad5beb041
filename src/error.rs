use std::fmt;
use std::io;

/// Possible errors from this crate.
///
/// Malformed header values and bodies never end up here, they fall back to
/// documented defaults. Only contract violations and response head parsing do.
#[derive(Debug)]
pub enum Error {
    /// A user/usage problem such as negotiating against an empty candidate list.
    User(String),
    /// A wrapped std::io::Error from a writer handed to the chunked encoder.
    Io(io::Error),
    /// HTTP/1.1 parse errors from the `httparse` crate.
    Http11Parser(httparse::Error),
    /// Http errors from the `http` crate.
    Http(http::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::User(v) => write!(f, "{}", v),
            Error::Io(v) => fmt::Display::fmt(v, f),
            Error::Http11Parser(v) => write!(f, "http11 parser: {}", v),
            Error::Http(v) => write!(f, "http api: {}", v),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::User(_) => None,
            Error::Io(v) => Some(v),
            Error::Http11Parser(v) => Some(v),
            Error::Http(v) => Some(v),
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<httparse::Error> for Error {
    fn from(e: httparse::Error) -> Self {
        Error::Http11Parser(e)
    }
}

impl From<http::Error> for Error {
    fn from(e: http::Error) -> Self {
        Error::Http(e)
    }
}
