//! The origin store seam.

use std::fmt;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::StoreError;

/// An object returned by a successful read.
#[derive(Clone, PartialEq, Eq)]
pub struct OriginObject {
    /// Content type reported by the store.
    pub content_type: String,
    /// Entity tag of the current version.
    pub etag: String,
    /// Raw object bytes.
    pub body: Bytes,
}

impl fmt::Debug for OriginObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OriginObject")
            .field("content_type", &self.content_type)
            .field("etag", &self.etag)
            .field("size", &self.body.len())
            .finish()
    }
}

/// A store that can perform conditional object reads.
///
/// Implementations must report a matching `validator` as
/// [`StoreError::NotModified`] and a missing object as
/// [`StoreError::NoSuchKey`]; everything else is free-form.
///
/// The trait uses `#[async_trait]` so it can be held as `Arc<dyn OriginStore>`.
#[async_trait]
pub trait OriginStore: Send + Sync + fmt::Debug {
    /// Read `bucket/key`, short-circuiting when `validator` is current.
    async fn get_object(
        &self,
        bucket: &str,
        key: &str,
        validator: Option<&str>,
    ) -> Result<OriginObject, StoreError>;
}
