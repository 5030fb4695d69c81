//! Mapping of request paths onto asset requests.

use percent_encoding::percent_decode_str;

/// Key served for the document root and, in SPA mode, for every
/// extension-less path.
pub const INDEX_DOCUMENT: &str = "index.html";

/// The asset a request path refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    /// Logical storage key, without a leading slash.
    pub key: String,
    /// `false` when the key should be resolved through the manifest.
    pub is_proxy: bool,
}

impl Route {
    fn captured(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            is_proxy: false,
        }
    }

    fn proxied(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            is_proxy: true,
        }
    }
}

/// Resolve a URI path.
///
/// - `/` and paths ending in `/` read the directory's index document.
/// - Extension-less paths read [`INDEX_DOCUMENT`] when `spa` is set,
///   otherwise `{path}/index.html`.
/// - Everything else is a direct fetch of the path itself.
///
/// All of the above except direct fetches are captured reads. Returns `None`
/// when the path does not percent-decode to UTF-8.
#[must_use]
pub fn resolve(path: &str, spa: bool) -> Option<Route> {
    let decoded = percent_decode_str(path).decode_utf8().ok()?;
    let key = decoded.trim_start_matches('/');

    if key.is_empty() {
        return Some(Route::captured(INDEX_DOCUMENT));
    }
    if key.ends_with('/') {
        if spa {
            return Some(Route::captured(INDEX_DOCUMENT));
        }
        return Some(Route::captured(format!("{key}{INDEX_DOCUMENT}")));
    }

    let last_segment = key.rsplit('/').next().unwrap_or(key);
    if last_segment.contains('.') {
        return Some(Route::proxied(key));
    }
    if spa {
        Some(Route::captured(INDEX_DOCUMENT))
    } else {
        Some(Route::captured(format!("{key}/{INDEX_DOCUMENT}")))
    }
}
