//! Manifest loading errors.

use std::path::PathBuf;

/// Failure to load a manifest that is present on disk.
///
/// A missing manifest is not an error (see
/// [`Manifest::load_optional`](crate::Manifest::load_optional)); an unreadable
/// or malformed one is, and callers are expected to abort startup on it.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    /// The manifest file could not be read.
    #[error("failed to read manifest {}: {source}", path.display())]
    Read {
        /// Manifest path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The manifest is not a JSON object of string to string.
    #[error("invalid manifest {}: {source}", path.display())]
    Parse {
        /// Manifest path.
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}
