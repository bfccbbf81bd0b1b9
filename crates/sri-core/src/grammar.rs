//! Integrity metadata grammar: `<alg>-<base64 value>[?<option>...]`.
//! See https://www.w3.org/TR/SRI/#the-integrity-attribute

use regex::Regex;

use crate::algorithm::{self, HashAlgorithm};
use crate::metadata::IntegrityMetadata;

lazy_static::lazy_static! {
    /// One metadata token. The value must have well-formed base64 shape (padding included);
    /// options are any printable ASCII after the first `?`.
    static ref METADATA: Regex = Regex::new(
        r"^(?P<alg>sha256|sha384|sha512)-(?P<val>(?:[A-Za-z0-9+/]{4})*(?:[A-Za-z0-9+/]{2}==|[A-Za-z0-9+/]{3}=)?)(?:[?](?P<opt>[\x21-\x7E]*))?$"
    )
    .expect("metadata pattern is valid");

    /// Runs of anything that is not printable ASCII separate tokens in a metadata list.
    static ref SEPARATOR: Regex = Regex::new(r"[^\x21-\x7E]+").expect("separator pattern is valid");
}

/// Characters stripped from both ends of a token: Unicode white space, line terminators
/// and the byte order mark. NEL (U+0085) is not white space for this purpose.
fn is_trimmable(c: char) -> bool {
    (c.is_whitespace() && c != '\u{85}') || c == '\u{feff}'
}

/// Trim a raw token before matching.
pub fn trim_token(token: &str) -> &str {
    token.trim_matches(is_trimmable)
}

/// Parse one token. Anything that does not match the grammar yields the empty entry;
/// this never fails.
pub fn parse(token: &str) -> IntegrityMetadata {
    parse_exact(trim_token(token))
}

/// Match `token` as-is, with no trimming. Used for tokens built from structured fields.
pub(crate) fn parse_exact(token: &str) -> IntegrityMetadata {
    let Some(caps) = METADATA.captures(token) else {
        return IntegrityMetadata::default();
    };

    let algorithm = caps
        .name("alg")
        .and_then(|m| HashAlgorithm::from_name(m.as_str()));
    let value = caps
        .name("val")
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();
    let options = caps
        .name("opt")
        .map(|m| m.as_str().split('?').map(String::from).collect())
        .unwrap_or_default();

    IntegrityMetadata::from_parts(algorithm, value, options)
}

/// Serialize fields into a canonical token.
///
/// Returns the empty string when `alg` or `val` is empty or `alg` is unsupported.
/// The value's base64 shape is not re-checked here.
pub fn stringify<S: AsRef<str>>(alg: &str, val: &str, opt: &[S]) -> String {
    if alg.is_empty() || val.is_empty() || !algorithm::is_supported(alg) {
        return String::new();
    }
    let mut out = String::with_capacity(alg.len() + 1 + val.len());
    out.push_str(alg);
    out.push('-');
    out.push_str(val);
    for o in opt {
        out.push('?');
        out.push_str(o.as_ref());
    }
    out
}

/// Split a metadata list on separator runs. Empty pieces (from leading or trailing
/// separators) are kept; they parse to the empty entry.
pub fn split_metadata(text: &str) -> impl Iterator<Item = &str> + '_ {
    SEPARATOR.split(text)
}
