//! Origin store backed by a local directory.
//!
//! Used by the development sandbox: the bucket is ignored and keys are
//! resolved relative to a public directory. Content types are guessed from
//! file extensions and ETags are MD5 digests of the file contents.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tracing::trace;

use crate::error::StoreError;
use crate::etag::{compute_etag, validator_matches};
use crate::store::{OriginObject, OriginStore};

/// Serves objects from files under `root`.
#[derive(Debug, Clone)]
pub struct LocalDirOrigin {
    root: PathBuf,
}

impl LocalDirOrigin {
    /// Create a store rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Map a key to a path under the root.
    ///
    /// Returns `None` for keys that would escape the root.
    fn object_path(&self, key: &str) -> Option<PathBuf> {
        let relative = Path::new(key.trim_start_matches('/'));
        let mut path = self.root.clone();
        for component in relative.components() {
            match component {
                Component::Normal(part) => path.push(part),
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
            }
        }
        Some(path)
    }
}

#[async_trait]
impl OriginStore for LocalDirOrigin {
    async fn get_object(
        &self,
        _bucket: &str,
        key: &str,
        validator: Option<&str>,
    ) -> Result<OriginObject, StoreError> {
        let not_found = || StoreError::NoSuchKey {
            key: key.to_owned(),
        };
        let path = self.object_path(key).ok_or_else(not_found)?;

        let data = match tokio::fs::read(&path).await {
            Ok(data) => data,
            Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::IsADirectory) => {
                return Err(not_found());
            }
            Err(e) => {
                return Err(StoreError::Transport(format!(
                    "failed to read {}: {e}",
                    path.display()
                )));
            }
        };

        let etag = compute_etag(&data);
        if validator.is_some_and(|v| validator_matches(&etag, v)) {
            return Err(StoreError::NotModified);
        }

        let content_type = mime_guess::from_path(&path)
            .first_or_octet_stream()
            .to_string();
        trace!(path = %path.display(), %content_type, "served object from local directory");

        Ok(OriginObject {
            content_type,
            etag,
            body: Bytes::from(data),
        })
    }
}
