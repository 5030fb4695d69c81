//! Normalized read outcomes.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::StoreError;
use crate::store::{OriginObject, OriginStore};

/// The result of exactly one conditional read.
///
/// Closed on purpose: callers match exhaustively and the HTTP status is a
/// pure function of the variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OriginOutcome {
    /// The object was fetched.
    Success(OriginObject),
    /// The client's validator is current.
    NotModified,
    /// The object does not exist.
    NotFound {
        /// Human-readable detail including the store's identifier.
        detail: String,
    },
    /// Any other store failure.
    OriginError {
        /// Human-readable detail including the store's identifier.
        detail: String,
    },
}

impl OriginOutcome {
    /// HTTP status code for this outcome.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Success(_) => 200,
            Self::NotModified => 304,
            Self::NotFound { .. } => 404,
            Self::OriginError { .. } => 500,
        }
    }

    /// Collapse a store result into an outcome.
    #[must_use]
    pub fn from_result(result: Result<OriginObject, StoreError>) -> Self {
        match result {
            Ok(object) => Self::Success(object),
            Err(StoreError::NotModified) => Self::NotModified,
            Err(err @ StoreError::NoSuchKey { .. }) => Self::NotFound {
                detail: err.to_string(),
            },
            Err(err @ (StoreError::Service { .. } | StoreError::Transport(_))) => {
                Self::OriginError {
                    detail: err.to_string(),
                }
            }
        }
    }
}

/// Performs conditional reads and classifies the result.
///
/// Cheap to clone; the store is shared behind an [`Arc`].
#[derive(Debug, Clone)]
pub struct OriginReader {
    store: Arc<dyn OriginStore>,
}

impl OriginReader {
    /// Create a reader over the given store.
    #[must_use]
    pub fn new(store: Arc<dyn OriginStore>) -> Self {
        Self { store }
    }

    /// Read `bucket/key` conditionally on `validator`.
    ///
    /// Never fails and never retries: every store result maps to one outcome.
    pub async fn read(&self, bucket: &str, key: &str, validator: Option<&str>) -> OriginOutcome {
        let result = self.store.get_object(bucket, key, validator).await;
        let outcome = OriginOutcome::from_result(result);
        match &outcome {
            OriginOutcome::Success(object) => debug!(
                bucket,
                key,
                etag = %object.etag,
                size = object.body.len(),
                "origin read succeeded"
            ),
            OriginOutcome::NotModified => debug!(bucket, key, "origin reports not modified"),
            OriginOutcome::NotFound { detail } => {
                debug!(bucket, key, %detail, "origin object not found");
            }
            OriginOutcome::OriginError { detail } => {
                warn!(bucket, key, %detail, "origin read failed");
            }
        }
        outcome
    }
}
