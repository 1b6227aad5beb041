#![warn(missing_docs, missing_debug_implementations)]
#![warn(clippy::all)]

//! HTTP helpers for negotiating request headers and decoding response bodies.
//!
//! This library provides the parts of HTTP handling that are about values
//! rather than transport: which of the representations a server offers best
//! fits what a client asked for, and how to get plain bytes out of a body
//! that arrived chunked and/or compressed. Sockets, requests and responses
//! are handled outside this library.
//!
//! ## In scope
//!
//! * Quality weighted header values, `Accept: text/html;q=0.9,*/*;q=0.8`.
//! * Negotiation against a list of accepted values, with a two letter prefix
//!   fallback for `Accept-Language`.
//! * `Transfer-Encoding: chunked` decoding of complete bodies.
//! * `Content-Encoding` gzip/deflate decompression, also of the many
//!   non-standard shapes servers send.
//!
//! ## Out of scope
//!
//! * Sending or receiving anything.
//! * Wildcard media ranges. `*/*` is a value like any other.
//! * URL building, MIME type tables.
//!
//! # Negotiation
//!
//! The first candidate is the default, used when the header is missing or
//! nothing in it matches.
//!
//! ```
//! use http_negotiate::{negotiate_content, negotiate_language};
//!
//! let ct = negotiate_content(Some("a;q=0.2,b;q=0.9"), &["a", "b"]).unwrap();
//! assert_eq!(ct, "b");
//!
//! let lang = negotiate_language(Some("en-GB;q=0.8"), &["en", "fr"]).unwrap();
//! assert_eq!(lang, "en");
//! ```
//!
//! With an `http::HeaderMap`, [`HeaderLookup`] does the header lookup.
//!
//! # Decoding
//!
//! [`decode_chunked`] and [`decompress`] never fail. Input that can't be
//! decoded is returned as is, so they can be applied to any body.
//! [`decode_body`] applies both, in that order, as the headers say.

#[macro_use]
extern crate log;

mod body;
mod chunked;
mod error;
mod header;
mod http11;
mod inflate;
mod negotiate;

pub use body::{decode_body, decode_response, BodyDecoding};
pub use chunked::{decode_chunked, ChunkedEncoder};
pub use error::Error;
pub use header::{HeaderValue, ParsedHeader};
pub use http11::parse_response;
pub use inflate::decompress;
pub use negotiate::{negotiate_content, negotiate_language, negotiate_language_scored};
pub use negotiate::{normalize_header_name, HeaderLookup, MatchTier, PrefixScore};
