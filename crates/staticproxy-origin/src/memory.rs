//! In-process origin store.
//!
//! [`MemoryOrigin`] keeps objects in a [`DashMap`] keyed by `(bucket, key)`
//! and computes MD5 ETags on write, the same way a real object store does for
//! single-part uploads. Useful as a stand-in origin and in tests.

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use tracing::trace;

use crate::error::StoreError;
use crate::etag::{compute_etag, validator_matches};
use crate::store::{OriginObject, OriginStore};

/// Thread-safe in-memory object store.
///
/// # Examples
///
/// ```
/// use bytes::Bytes;
/// use staticproxy_origin::{MemoryOrigin, OriginStore, StoreError};
///
/// # tokio_test::block_on(async {
/// let origin = MemoryOrigin::new();
/// let etag = origin.put_object("assets", "app.js", "text/javascript", Bytes::from("1"));
///
/// let obj = origin.get_object("assets", "app.js", None).await.unwrap();
/// assert_eq!(obj.etag, etag);
///
/// let err = origin.get_object("assets", "app.js", Some(&etag)).await.unwrap_err();
/// assert_eq!(err, StoreError::NotModified);
/// # });
/// ```
#[derive(Debug, Default)]
pub struct MemoryOrigin {
    objects: DashMap<(String, String), OriginObject>,
}

impl MemoryOrigin {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an object, replacing any previous version. Returns its ETag.
    pub fn put_object(
        &self,
        bucket: impl Into<String>,
        key: impl Into<String>,
        content_type: impl Into<String>,
        body: Bytes,
    ) -> String {
        let etag = compute_etag(&body);
        let object = OriginObject {
            content_type: content_type.into(),
            etag: etag.clone(),
            body,
        };
        self.objects.insert((bucket.into(), key.into()), object);
        etag
    }

    /// Remove an object. Returns whether it existed.
    pub fn delete_object(&self, bucket: &str, key: &str) -> bool {
        self.objects
            .remove(&(bucket.to_owned(), key.to_owned()))
            .is_some()
    }

    /// Number of stored objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[async_trait]
impl OriginStore for MemoryOrigin {
    async fn get_object(
        &self,
        bucket: &str,
        key: &str,
        validator: Option<&str>,
    ) -> Result<OriginObject, StoreError> {
        let object = self
            .objects
            .get(&(bucket.to_owned(), key.to_owned()))
            .map(|entry| entry.value().clone())
            .ok_or_else(|| StoreError::NoSuchKey {
                key: key.to_owned(),
            })?;

        if validator.is_some_and(|v| validator_matches(&object.etag, v)) {
            return Err(StoreError::NotModified);
        }

        trace!(bucket, key, size = object.body.len(), "served object from memory");
        Ok(object)
    }
}
