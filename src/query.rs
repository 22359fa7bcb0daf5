//! Normalization of raw query descriptions into flat key/value mappings.
//!
//! Callers may hand over an already-structured mapping, a bare query
//! fragment, or a full URL copied out of a browser bar. Everything funnels
//! into the same flat string map so the rest of the pipeline never has to
//! care where a query came from. Parsing is best-effort and never fails:
//! malformed fragments degrade to whatever pairs can be recovered.

use std::{collections::BTreeMap, sync::OnceLock};

use regex::Regex;

/// Query key that carries the account identity.
pub const IDENTITY_KEY: &str = "username";

/// Flat, ordered mapping of query keys to values.
pub type QueryMap = BTreeMap<String, String,>;

/// Raw query description accepted from the caller.
#[derive(Debug, Clone, PartialEq, Eq,)]
pub enum QueryInput
{
    /// An already-structured mapping, passed through unchanged.
    Map(QueryMap,),
    /// A query fragment or URL to be sniffed and parsed.
    Text(String,),
}

static SCHEME_PREFIX: OnceLock<Regex,> = OnceLock::new();

/// Prefix that marks a string as a URL rather than a bare query fragment.
fn scheme_prefix() -> &'static Regex
{
    SCHEME_PREFIX.get_or_init(|| {
        Regex::new(r"^[A-Za-z][A-Za-z0-9+.-]*://",).expect("valid scheme pattern",)
    },)
}

/// Resolves a raw query description into a flat mapping.
///
/// Returns `None` when no query was supplied at all: absent input, or a
/// string that is empty after trimming. Every other input resolves to a
/// mapping, possibly empty when nothing parses. "Has a query" is therefore
/// a property of the mapping being non-empty, not of the return being
/// `Some`.
///
/// A string is treated as a URL when it contains `?`, begins with a
/// `scheme://` prefix, or begins with `/`; the query component is the text
/// after the first `?`, cut at the first `#`. Any other string is used as
/// the query component directly, with a leading `?` stripped.
pub fn resolve_query(input: Option<&QueryInput,>,) -> Option<QueryMap,>
{
    match input {
        None => None,
        Some(QueryInput::Map(map,),) => Some(map.clone(),),
        Some(QueryInput::Text(raw,),) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return None;
            }
            Some(parse_pairs(query_component(trimmed,),),)
        }
    }
}

fn looks_like_url(raw: &str,) -> bool
{
    raw.contains('?',) || raw.starts_with('/',) || scheme_prefix().is_match(raw,)
}

fn query_component(raw: &str,) -> &str
{
    let component = if looks_like_url(raw,) {
        match raw.split_once('?',) {
            Some((_, rest,),) => rest,
            None => "",
        }
    } else {
        raw
    };

    let component = component.strip_prefix('?',).unwrap_or(component,);
    component.split('#',).next().unwrap_or("",)
}

fn parse_pairs(component: &str,) -> QueryMap
{
    let mut map = QueryMap::new();

    for segment in component.split('&',) {
        if segment.is_empty() {
            continue;
        }
        let (key, value,) = match segment.split_once('=',) {
            Some((key, value,),) => (key, value,),
            None => (segment, "",),
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        map.insert(key.to_owned(), value.trim().to_owned(),);
    }

    map
}
