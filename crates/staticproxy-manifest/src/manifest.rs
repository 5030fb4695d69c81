//! The logical-path to fingerprinted-key mapping.

use std::borrow::Cow;
use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, info};

use crate::directive::replace_directives;
use crate::error::ManifestError;

/// Immutable mapping from logical asset paths to fingerprinted storage keys.
///
/// An empty manifest is the identity mapping: every lookup returns its input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    entries: HashMap<String, String>,
}

impl Manifest {
    /// Create an empty (identity) manifest.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create a manifest from pre-built entries.
    #[must_use]
    pub fn from_entries(entries: HashMap<String, String>) -> Self {
        Self { entries }
    }

    /// Parse a manifest from JSON text.
    ///
    /// `path` is only used for error reporting.
    pub fn parse(path: &Path, content: &str) -> Result<Self, ManifestError> {
        let entries: HashMap<String, String> =
            serde_json::from_str(content).map_err(|source| ManifestError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self { entries })
    }

    /// Load a manifest that must exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ManifestError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let manifest = Self::parse(path, &content)?;
        info!(path = %path.display(), entries = manifest.len(), "loaded fingerprint manifest");
        Ok(manifest)
    }

    /// Load a manifest if the file exists, otherwise return the identity
    /// manifest.
    ///
    /// A file that exists but cannot be read or parsed is still an error.
    pub fn load_optional(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            debug!(path = %path.display(), "no fingerprint manifest, using identity mapping");
            Ok(Self::empty())
        }
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the manifest has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fingerprinted key for `path`, if the manifest tracks it.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&str> {
        self.entries.get(path).map(String::as_str)
    }

    /// Resolve a logical path to its storage key.
    ///
    /// A miss returns `path` unchanged so untracked files still resolve to
    /// their un-fingerprinted object.
    #[must_use]
    pub fn resolve<'a>(&'a self, path: &'a str) -> &'a str {
        self.get(path).unwrap_or(path)
    }

    /// Replace every asset directive in `text` with its resolved key.
    ///
    /// Returns the input borrowed when there is nothing to replace, so the
    /// caller can tell whether a new buffer was produced.
    #[must_use]
    pub fn rewrite<'t>(&self, text: &'t str) -> Cow<'t, str> {
        let mut directives = 0_usize;
        let rewritten = replace_directives(text, |path| {
            directives += 1;
            self.resolve(path).to_owned()
        });
        if directives > 0 {
            debug!(directives, "rewrote asset directives");
        }
        rewritten
    }
}
