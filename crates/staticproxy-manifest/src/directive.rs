//! Asset directives embedded in text assets.
//!
//! Two call forms are recognized, each taking a single quoted path literal:
//!
//! - bare: `${STATIC('images/logo.png')}`
//! - namespaced: `${arc.static('images/logo.png')}`
//!
//! The whole `${...}` expression is replaced by the resolved key.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Name of the bare directive.
pub const BARE_DIRECTIVE: &str = "STATIC";

/// Name of the namespaced directive.
pub const NAMESPACED_DIRECTIVE: &str = "arc.static";

static DIRECTIVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(
        r#"\$\{{\s*(?:{}|{})\(\s*(?:'([^']+)'|"([^"]+)"|`([^`]+)`)\s*\)\s*\}}"#,
        regex::escape(BARE_DIRECTIVE),
        regex::escape(NAMESPACED_DIRECTIVE),
    );
    Regex::new(&pattern).unwrap_or_else(|e| panic!("directive pattern must compile: {e}"))
});

/// The path literal of a matched directive, whichever quote style it used.
fn directive_path<'t>(caps: &Captures<'t>) -> &'t str {
    caps.get(1)
        .or_else(|| caps.get(2))
        .or_else(|| caps.get(3))
        .map_or("", |m| m.as_str())
}

/// Replace every directive in `text` with `resolve(path)`.
///
/// Returns [`Cow::Borrowed`] when nothing matched.
pub(crate) fn replace_directives<'t, F>(text: &'t str, mut resolve: F) -> Cow<'t, str>
where
    F: FnMut(&str) -> String,
{
    DIRECTIVE_RE.replace_all(text, |caps: &Captures<'_>| resolve(directive_path(caps)))
}
