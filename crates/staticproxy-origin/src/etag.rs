//! Entity tag helpers.

use digest::Digest;

/// Compute the quoted hex MD5 of `data`, in the form object stores use for
/// single-part ETags.
///
/// # Examples
///
/// ```
/// use staticproxy_origin::etag::compute_etag;
///
/// assert_eq!(compute_etag(b""), "\"d41d8cd98f00b204e9800998ecf8427e\"");
/// ```
#[must_use]
pub fn compute_etag(data: &[u8]) -> String {
    let hash = md5::Md5::digest(data);
    format!("\"{}\"", hex::encode(hash))
}

/// Whether an `If-None-Match` validator matches `etag`, meaning the client's
/// copy is current and a 304 is appropriate.
///
/// Accepts `*`, comma-separated lists, quoted or bare tags, and weak
/// (`W/`) tags.
///
/// # Examples
///
/// ```
/// use staticproxy_origin::etag::validator_matches;
///
/// assert!(validator_matches("\"abc\"", "*"));
/// assert!(validator_matches("\"abc\"", "abc"));
/// assert!(validator_matches("\"abc\"", "\"xyz\", W/\"abc\""));
/// assert!(!validator_matches("\"abc\"", "\"xyz\""));
/// ```
#[must_use]
pub fn validator_matches(etag: &str, validator: &str) -> bool {
    let validator = validator.trim();
    if validator == "*" {
        return true;
    }
    let etag = normalize_etag(etag);
    validator
        .split(',')
        .map(normalize_etag)
        .any(|candidate| !candidate.is_empty() && candidate == etag)
}

/// Strip whitespace, a weak prefix and surrounding double quotes.
fn normalize_etag(etag: &str) -> &str {
    let etag = etag.trim();
    let etag = etag.strip_prefix("W/").unwrap_or(etag);
    etag.strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(etag)
}
