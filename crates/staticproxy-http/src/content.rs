//! Content-type policy: what can be rewritten and what must not be cached.

use mime::Mime;

/// `Cache-Control` for dynamic page types (HTML, JSON).
pub const NO_CACHE: &str = "no-cache, no-store, must-revalidate, max-age=0, s-maxage=0";

/// `Cache-Control` for everything else.
pub const DEFAULT_CACHE: &str = "max-age=86400";

fn parse(content_type: &str) -> Option<Mime> {
    content_type.trim().parse().ok()
}

/// Whether `content_type` is text that can carry asset directives.
///
/// # Examples
///
/// ```
/// use staticproxy_http::content::is_text_like;
///
/// assert!(is_text_like("text/html; charset=utf-8"));
/// assert!(is_text_like("application/javascript"));
/// assert!(is_text_like("image/svg+xml"));
/// assert!(!is_text_like("image/gif"));
/// ```
#[must_use]
pub fn is_text_like(content_type: &str) -> bool {
    let Some(m) = parse(content_type) else {
        return false;
    };
    if m.type_() == mime::TEXT {
        return true;
    }
    if m.suffix() == Some(mime::JSON) || m.suffix() == Some(mime::XML) {
        return true;
    }
    m.type_() == mime::APPLICATION
        && matches!(
            m.subtype().as_str(),
            "javascript" | "x-javascript" | "ecmascript" | "json" | "xml"
        )
}

/// Whether responses of this type must not be cached.
///
/// # Examples
///
/// ```
/// use staticproxy_http::content::is_anti_cached;
///
/// assert!(is_anti_cached("text/html"));
/// assert!(is_anti_cached("application/json; charset=utf-8"));
/// assert!(!is_anti_cached("text/css"));
/// ```
#[must_use]
pub fn is_anti_cached(content_type: &str) -> bool {
    let Some(m) = parse(content_type) else {
        return false;
    };
    (m.type_() == mime::TEXT && m.subtype() == mime::HTML)
        || (m.type_() == mime::APPLICATION && m.subtype() == mime::JSON)
        || m.suffix() == Some(mime::JSON)
}

/// The computed `Cache-Control` directive for a content type.
#[must_use]
pub fn cache_control_for(content_type: &str) -> &'static str {
    if is_anti_cached(content_type) {
        NO_CACHE
    } else {
        DEFAULT_CACHE
    }
}
