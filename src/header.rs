//! Parsing of quality weighted, comma separated header values.
//!
//! Headers such as `Accept` and `Accept-Language` carry a list of values,
//! each optionally weighted with a `q` (or legacy `level`) parameter:
//!
//! ```text
//! text/html,application/xhtml+xml;q=0.9,*/*;q=0.8
//! ```
//!
//! [`ParsedHeader::parse`] turns such a string into a list ordered by
//! preference, highest quality first, and the first listed value first when
//! two values share a quality.

use crate::negotiate::{MatchTier, PrefixScore};
use crate::Error;
use std::cmp::Ordering;

/// Quality for values without a `q` parameter.
const DEFAULT_QUALITY: f32 = 1.0;

/// Quality for values whose `q` parameter isn't a plain decimal number.
///
/// A malformed weight must not promote a value to full priority, so it ranks
/// below anything the client did express a weight for.
const MALFORMED_QUALITY: f32 = 0.0;

/// One value of a multi value header.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderValue {
    value: String,
    quality: f32,
    position: usize,
}

impl HeaderValue {
    /// The negotiable token, i.e. `text/html` or `en-US`.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// The quality weight, `1.0` when the header didn't specify one.
    pub fn quality(&self) -> f32 {
        self.quality
    }

    /// Zero based index in the original comma separated list.
    pub fn position(&self) -> usize {
        self.position
    }

    fn from_term(term: &str, position: usize) -> Self {
        let (value, quality) = match split_quality(term) {
            Some((value, raw)) => (value, parse_quality(raw)),
            None => (term, DEFAULT_QUALITY),
        };

        HeaderValue {
            value: value.to_string(),
            quality,
            position,
        }
    }

    fn preference(&self, other: &HeaderValue) -> Ordering {
        // qualities are always finite, see parse_quality()
        other
            .quality
            .partial_cmp(&self.quality)
            .unwrap_or(Ordering::Equal)
            .then(self.position.cmp(&other.position))
    }
}

/// A header value split into its weighted parts, in order of preference.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedHeader {
    values: Vec<HeaderValue>,
}

impl ParsedHeader {
    /// Parse a raw header value.
    ///
    /// An empty string gives an empty `ParsedHeader`. Empty list terms, like in
    /// `a,,b`, are skipped but still count for positions.
    pub fn parse(raw: &str) -> Self {
        let mut values: Vec<HeaderValue> = raw
            .split(',')
            .map(str::trim)
            .enumerate()
            .filter(|(_, term)| !term.is_empty())
            .map(|(i, term)| HeaderValue::from_term(term, i))
            .collect();

        values.sort_by(HeaderValue::preference);

        trace!("Parsed header {:?}: {:?}", raw, values);

        ParsedHeader { values }
    }

    /// The values, highest quality first.
    pub fn values(&self) -> &[HeaderValue] {
        &self.values
    }

    /// Iterate the values in order of preference.
    pub fn iter(&self) -> std::slice::Iter<'_, HeaderValue> {
        self.values.iter()
    }

    /// Number of values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Tells if the header had no values at all.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Pick the best candidate for this header.
    ///
    /// `candidates[0]` is the default when nothing matches. Prefix matches found
    /// by [`MatchTier::Prefix`] are appended to `scores` when given.
    pub fn negotiate<'c, S: AsRef<str>>(
        &self,
        candidates: &'c [S],
        tier: MatchTier,
        scores: Option<&mut Vec<PrefixScore>>,
    ) -> Result<&'c str, Error> {
        crate::negotiate::negotiate_parsed(self, candidates, tier, scores)
    }
}

impl From<&str> for ParsedHeader {
    fn from(raw: &str) -> Self {
        ParsedHeader::parse(raw)
    }
}

impl<'a> IntoIterator for &'a ParsedHeader {
    type Item = &'a HeaderValue;
    type IntoIter = std::slice::Iter<'a, HeaderValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

/// Split `<token> ; q=<float>` into token and the raw float.
///
/// The rightmost `q`/`level` parameter is used, so any other parameters stay
/// part of the value: `text/html;charset=utf-8;q=0.5` is `text/html;charset=utf-8`.
/// The token itself can't contain whitespace.
fn split_quality(term: &str) -> Option<(&str, &str)> {
    for (idx, _) in term.rmatch_indices(';') {
        let value = term[..idx].trim_end();
        if value.is_empty() || value.contains(char::is_whitespace) {
            continue;
        }

        let param = term[idx + 1..].trim_start();
        let rest = match strip_prefix_ignore_case(param, "q")
            .or_else(|| strip_prefix_ignore_case(param, "level"))
        {
            Some(v) => v.trim_start(),
            None => continue,
        };

        if let Some(raw) = rest.strip_prefix('=') {
            return Some((value, raw.trim_start()));
        }
    }

    None
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    s.get(..prefix.len())
        .filter(|p| p.eq_ignore_ascii_case(prefix))
        .map(|_| &s[prefix.len()..])
}

/// Parse the float of a `q=` parameter, anything after the first whitespace
/// or `;` is ignored.
fn parse_quality(raw: &str) -> f32 {
    let num = raw
        .split(|c: char| c == ';' || c.is_whitespace())
        .next()
        .unwrap_or("");

    let plain = !num.is_empty() && num.chars().all(|c| c.is_ascii_digit() || c == '.');

    match num.parse::<f32>() {
        Ok(q) if plain && q.is_finite() => q,
        _ => {
            debug!("Malformed quality {:?}, using {}", raw, MALFORMED_QUALITY);
            MALFORMED_QUALITY
        }
    }
}
