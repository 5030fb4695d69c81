//! Session store errors.

/// Failure of the underlying session store.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The session table does not exist.
    #[error("session table not found: {table}")]
    TableNotFound {
        /// Table name.
        table: String,
    },

    /// The backing store failed; the original error is the source.
    #[error("session store failure: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}
