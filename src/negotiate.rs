//! Picking a response value from a request header.
//!
//! Negotiation walks the parsed header values in order of preference and
//! returns the first one the caller accepts. The first candidate is the
//! default, used both when the header is missing and when nothing in it
//! matches.
//!
//! Languages get a second chance: `Accept-Language: en-GB` has no exact match
//! in `["en", "fr"]`, but the two letter prefix `en` does, see [`MatchTier`].

use crate::header::ParsedHeader;
use crate::Error;
use std::collections::HashMap;

/// Scale applied to the quality of prefix matched languages.
const PREFIX_SCORE_SCALE: f32 = 90.0;

/// How values are matched against candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchTier {
    /// Byte for byte equality only.
    Exact,
    /// Exact matching first. If nothing matches, compare the first two
    /// characters of header values and candidates. Among prefix matches the
    /// lowest `quality * 90` score wins, the first found on ties.
    Prefix,
}

/// A candidate found through the language prefix fallback.
#[derive(Debug, Clone, PartialEq)]
pub struct PrefixScore {
    /// Ranking key, `quality * 90` of the matching header value.
    pub score: f32,
    /// The candidate the header value matched by prefix.
    pub language: String,
}

/// Negotiate a header such as `Accept` by exact match.
///
/// `header` is `None` when the request didn't have one.
///
/// ```
/// let picked = http_negotiate::negotiate_content(
///     Some("text/html;q=0.5,application/json"),
///     &["text/html", "application/json"],
/// ).unwrap();
///
/// assert_eq!(picked, "application/json");
/// ```
pub fn negotiate_content<'c, S: AsRef<str>>(
    header: Option<&str>,
    candidates: &'c [S],
) -> Result<&'c str, Error> {
    let parsed = ParsedHeader::parse(header.unwrap_or(""));
    negotiate_parsed(&parsed, candidates, MatchTier::Exact, None)
}

/// Negotiate an `Accept-Language` header, falling back on prefix matching.
pub fn negotiate_language<'c, S: AsRef<str>>(
    header: Option<&str>,
    candidates: &'c [S],
) -> Result<&'c str, Error> {
    let parsed = ParsedHeader::parse(header.unwrap_or(""));
    negotiate_parsed(&parsed, candidates, MatchTier::Prefix, None)
}

/// Like [`negotiate_language`], but also returns every prefix match found.
///
/// The list is empty when an exact match was found or nothing matched at all.
pub fn negotiate_language_scored<'c, S: AsRef<str>>(
    header: Option<&str>,
    candidates: &'c [S],
) -> Result<(&'c str, Vec<PrefixScore>), Error> {
    let parsed = ParsedHeader::parse(header.unwrap_or(""));
    let mut scores = vec![];
    let picked = negotiate_parsed(&parsed, candidates, MatchTier::Prefix, Some(&mut scores))?;
    Ok((picked, scores))
}

pub(crate) fn negotiate_parsed<'c, S: AsRef<str>>(
    parsed: &ParsedHeader,
    candidates: &'c [S],
    tier: MatchTier,
    scores: Option<&mut Vec<PrefixScore>>,
) -> Result<&'c str, Error> {
    let default = candidates
        .first()
        .map(|c| c.as_ref())
        .ok_or_else(|| Error::User("Negotiation requires at least one candidate".into()))?;

    if parsed.is_empty() {
        trace!("No header values, default: {}", default);
        return Ok(default);
    }

    if let Some(exact) = exact_match(parsed, candidates) {
        trace!("Exact match: {}", exact);
        return Ok(exact);
    }

    if tier == MatchTier::Prefix {
        if let Some(prefixed) = prefix_match(parsed, candidates, scores) {
            trace!("Prefix match: {}", prefixed);
            return Ok(prefixed);
        }
    }

    trace!("No match, default: {}", default);

    Ok(default)
}

fn exact_match<'c, S: AsRef<str>>(parsed: &ParsedHeader, candidates: &'c [S]) -> Option<&'c str> {
    parsed.iter().find_map(|v| {
        candidates
            .iter()
            .map(|c| c.as_ref())
            .find(|c| *c == v.value())
    })
}

fn prefix_match<'c, S: AsRef<str>>(
    parsed: &ParsedHeader,
    candidates: &'c [S],
    mut scores: Option<&mut Vec<PrefixScore>>,
) -> Option<&'c str> {
    let mut by_prefix: HashMap<&str, &'c str> = HashMap::new();
    for c in candidates {
        let c = c.as_ref();
        // last listed candidate owns the prefix
        by_prefix.insert(prefix(c), c);
    }

    let mut best: Option<(f32, &'c str)> = None;

    for v in parsed {
        let candidate = match by_prefix.get(prefix(v.value())) {
            Some(c) => *c,
            None => continue,
        };

        let score = v.quality() * PREFIX_SCORE_SCALE;

        if let Some(scores) = scores.as_mut() {
            scores.push(PrefixScore {
                score,
                language: candidate.to_string(),
            });
        }

        // strictly lower, the first found minimum is kept
        match best {
            Some((min, _)) if score >= min => {}
            _ => best = Some((score, candidate)),
        }
    }

    best.map(|(_, candidate)| candidate)
}

/// The first two characters.
fn prefix(s: &str) -> &str {
    match s.char_indices().nth(2) {
        Some((i, _)) => &s[..i],
        None => s,
    }
}

/// Normalize a header name for lookup.
///
/// Lowercased, `_` replaced by `-` and a leading `http-` removed, which makes
/// CGI style names like `HTTP_ACCEPT_LANGUAGE` work as well as `Accept-Language`.
pub fn normalize_header_name(name: &str) -> String {
    let lower = name.trim().to_ascii_lowercase().replace('_', "-");
    match lower.strip_prefix("http-") {
        Some(rest) => rest.to_string(),
        None => lower,
    }
}

/// Access to request headers by name.
///
/// Provided methods negotiate the well known headers. A missing header, or one
/// whose value isn't visible ASCII, negotiates to the default candidate.
pub trait HeaderLookup {
    /// Get a header value by (non normalized) name.
    fn header(&self, name: &str) -> Option<&str>;

    /// Negotiate any multi value header by exact match.
    fn negotiate_header<'c, S: AsRef<str>>(
        &self,
        name: &str,
        candidates: &'c [S],
    ) -> Result<&'c str, Error> {
        negotiate_content(self.header(name), candidates)
    }

    /// Negotiate the `Accept` header.
    fn negotiate_content_type<'c, S: AsRef<str>>(&self, candidates: &'c [S]) -> Result<&'c str, Error> {
        self.negotiate_header("accept", candidates)
    }

    /// Negotiate the `Accept-Language` header with prefix fallback.
    fn negotiate_language<'c, S: AsRef<str>>(&self, candidates: &'c [S]) -> Result<&'c str, Error> {
        crate::negotiate::negotiate_language(self.header("accept-language"), candidates)
    }

    /// Tells if `value` occurs anywhere in the header.
    fn contains_value(&self, name: &str, value: &str, match_case: bool) -> bool {
        match self.header(name) {
            Some(h) if match_case => h.contains(value),
            Some(h) => h
                .to_ascii_lowercase()
                .contains(&value.to_ascii_lowercase()),
            None => false,
        }
    }
}

impl HeaderLookup for http::HeaderMap {
    fn header(&self, name: &str) -> Option<&str> {
        let name = normalize_header_name(name);
        let value = self.get(name.as_str())?;

        match value.to_str() {
            Ok(v) => Some(v),
            Err(e) => {
                debug!("Ignoring header {} with bad value: {}", name, e);
                None
            }
        }
    }
}

impl HeaderLookup for HashMap<String, String> {
    fn header(&self, name: &str) -> Option<&str> {
        let name = normalize_header_name(name);
        self.iter()
            .find(|(k, _)| normalize_header_name(k) == name)
            .map(|(_, v)| v.as_str())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn prefix_of_short_values() {
        assert_eq!(prefix("en-US"), "en");
        assert_eq!(prefix("e"), "e");
        assert_eq!(prefix(""), "");
        assert_eq!(prefix("ñö-x"), "ñö");
    }

    #[test]
    fn normalize_names() {
        assert_eq!(normalize_header_name("HTTP_ACCEPT_LANGUAGE"), "accept-language");
        assert_eq!(normalize_header_name("Accept-Language"), "accept-language");
        assert_eq!(normalize_header_name("http-accept"), "accept");
    }

    #[test]
    fn last_candidate_owns_prefix() {
        let parsed = ParsedHeader::parse("en-AU");
        let picked = negotiate_parsed(&parsed, &["fr", "en-US", "en-GB"], MatchTier::Prefix, None);
        assert_eq!(picked.unwrap(), "en-GB");
    }

    #[test]
    fn prefix_match_keeps_first_lowest_score() {
        let parsed = ParsedHeader::parse("fr-CA;q=0.5,en-GB;q=0.5,de-AT;q=0.5");
        let mut scores = vec![];
        let picked = prefix_match(&parsed, &["fr", "en", "de"], Some(&mut scores));
        assert_eq!(picked, Some("fr"));
        assert_eq!(scores.len(), 3);
    }

    #[test]
    fn exact_tier_ignores_prefix() {
        let parsed = ParsedHeader::parse("en-AU");
        let picked = negotiate_parsed(&parsed, &["fr", "en"], MatchTier::Exact, None);
        assert_eq!(picked.unwrap(), "fr");
    }
}
