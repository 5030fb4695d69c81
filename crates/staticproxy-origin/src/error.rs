//! Store-level failure signals.

/// Failure reported by an [`OriginStore`](crate::OriginStore).
///
/// The `Display` form of each variant starts with the store's error
/// identifier (`NoSuchKey`, the service code, ...) so it can be shown to
/// users as-is.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The validator matches the current object version.
    #[error("NotModified: the object has not changed")]
    NotModified,

    /// The requested object does not exist.
    #[error("NoSuchKey: the specified key does not exist: {key}")]
    NoSuchKey {
        /// Key that was requested.
        key: String,
    },

    /// The store rejected the request with an error code.
    #[error("{code}: {message}")]
    Service {
        /// Store error code or name.
        code: String,
        /// Human-readable message.
        message: String,
    },

    /// The store could not be reached or the body could not be read.
    #[error("transport error: {0}")]
    Transport(String),
}

impl StoreError {
    /// Convenience constructor for a coded service error.
    #[must_use]
    pub fn service(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Service {
            code: code.into(),
            message: message.into(),
        }
    }
}
