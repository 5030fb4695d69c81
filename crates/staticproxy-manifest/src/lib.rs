//! Fingerprint manifest for staticproxy.
//!
//! A build step uploads assets under content-hashed names (`app-a1c3e5.js`)
//! and writes a JSON manifest mapping each logical path to its fingerprinted
//! key. [`Manifest`] is loaded once at startup and shared read-only; it
//! resolves single keys and rewrites asset directives embedded in text.
//!
//! ```
//! use std::collections::HashMap;
//! use staticproxy_manifest::Manifest;
//!
//! let manifest = Manifest::from_entries(HashMap::from([(
//!     "app.js".to_owned(),
//!     "app-a1c3e5.js".to_owned(),
//! )]));
//! assert_eq!(manifest.resolve("app.js"), "app-a1c3e5.js");
//! assert_eq!(manifest.resolve("other.js"), "other.js");
//! assert_eq!(
//!     manifest.rewrite("<script src=${STATIC('app.js')}>"),
//!     "<script src=app-a1c3e5.js>"
//! );
//! ```

mod directive;
mod error;
mod manifest;

pub use directive::{BARE_DIRECTIVE, NAMESPACED_DIRECTIVE};
pub use error::ManifestError;
pub use manifest::Manifest;
