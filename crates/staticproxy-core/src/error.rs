//! Error types for the staticproxy core.

/// Core error type for proxy infrastructure.
///
/// Per-request origin failures never surface as this type; they are folded
/// into a [`NormalizedResponse`](crate::NormalizedResponse). This covers
/// startup and wiring failures only.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Convenience result type for proxy operations.
pub type ProxyResult<T> = Result<T, ProxyError>;
