//! Local stand-in for the live origin.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use staticproxy_core::{AssetRequest, NormalizedResponse};
use staticproxy_manifest::Manifest;
use staticproxy_origin::LocalDirOrigin;
use tracing::debug;

use crate::proxy::Pipeline;

/// Answers requests when no live infrastructure is available.
///
/// Implementations return a finished [`NormalizedResponse`]; the proxy
/// forwards it without further processing.
#[async_trait]
pub trait SandboxReader: Send + Sync + std::fmt::Debug {
    /// Produce the response for `request`.
    async fn read(&self, request: &AssetRequest) -> NormalizedResponse;
}

/// Serves assets from a local public directory.
///
/// Runs the same pipeline as the live proxy over a [`LocalDirOrigin`], so
/// validators, rewriting and encoding behave identically. The bucket of the
/// request is ignored. A captured request whose fingerprinted file is absent
/// locally is retried with the unfingerprinted key, since local builds
/// rarely emit fingerprinted copies.
#[derive(Debug, Clone)]
pub struct FsSandbox {
    pipeline: Pipeline,
}

impl FsSandbox {
    /// Create a sandbox serving files under `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, manifest: Arc<Manifest>) -> Self {
        let origin = Arc::new(LocalDirOrigin::new(root));
        Self {
            pipeline: Pipeline::new(manifest, origin),
        }
    }
}

#[async_trait]
impl SandboxReader for FsSandbox {
    async fn read(&self, request: &AssetRequest) -> NormalizedResponse {
        let key = self.pipeline.storage_key(request);
        let response = self.pipeline.run_with_key(request, key).await;
        if response.status_code == 404 && key != request.key {
            debug!(
                resolved = %key,
                key = %request.key,
                "fingerprinted file missing locally, serving unfingerprinted"
            );
            return self.pipeline.run_with_key(request, &request.key).await;
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::content::NO_CACHE;
    use crate::normalize::{CACHE_CONTROL, ETAG};

    fn sandbox(files: &[(&str, &str)], manifest: Manifest) -> (tempfile::TempDir, FsSandbox) {
        let dir = tempfile::tempdir().expect("tempdir");
        for (name, content) in files {
            let path = dir.path().join(name);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).expect("mkdir");
            }
            std::fs::write(path, content).expect("write");
        }
        let sandbox = FsSandbox::new(dir.path(), Arc::new(manifest));
        (dir, sandbox)
    }

    fn captured(key: &str) -> AssetRequest {
        AssetRequest::builder()
            .bucket("ignored")
            .key(key)
            .is_proxy(false)
            .build()
    }

    #[tokio::test]
    async fn test_should_serve_local_html_as_plain_text() {
        let (_dir, sandbox) = sandbox(&[("index.html", "<h1>hi</h1>")], Manifest::empty());
        let resp = sandbox.read(&captured("index.html")).await;
        assert_eq!(resp.status_code, 200);
        assert!(!resp.is_base64_encoded);
        assert_eq!(resp.body, "<h1>hi</h1>");
        assert_eq!(resp.header(CACHE_CONTROL), Some(NO_CACHE));
    }

    #[tokio::test]
    async fn test_should_honor_validator_against_local_etag() {
        let (_dir, sandbox) = sandbox(&[("app.js", "console.log(1)")], Manifest::empty());
        let first = sandbox
            .read(&AssetRequest::builder().bucket("b").key("app.js").build())
            .await;
        let etag = first.header(ETAG).expect("etag").to_owned();

        let second = sandbox
            .read(
                &AssetRequest::builder()
                    .bucket("b")
                    .key("app.js")
                    .validator(etag.clone())
                    .build(),
            )
            .await;
        assert_eq!(second.status_code, 304);
        assert_eq!(second.header(ETAG), Some(etag.as_str()));
    }

    #[tokio::test]
    async fn test_should_return_404_for_missing_file() {
        let (_dir, sandbox) = sandbox(&[], Manifest::empty());
        let resp = sandbox.read(&captured("nope.html")).await;
        assert_eq!(resp.status_code, 404);
    }

    #[tokio::test]
    async fn test_should_fall_back_when_fingerprinted_file_is_missing() {
        let manifest = Manifest::from_entries(HashMap::from([(
            "index.html".to_owned(),
            "index-b2d4f6.html".to_owned(),
        )]));
        let (_dir, sandbox) = sandbox(&[("index.html", "plain")], manifest);
        let resp = sandbox.read(&captured("index.html")).await;
        assert_eq!(resp.status_code, 200);
        assert_eq!(resp.body, "plain");
    }

    #[tokio::test]
    async fn test_should_rewrite_directives_in_local_files() {
        let manifest = Manifest::from_entries(HashMap::from([(
            "logo.png".to_owned(),
            "logo-abc.png".to_owned(),
        )]));
        let files = [("index.html", "<img src=${STATIC('logo.png')}>")];
        let (_dir, sandbox) = sandbox(&files, manifest);
        let resp = sandbox.read(&captured("index.html")).await;
        assert_eq!(resp.body, "<img src=logo-abc.png>");
    }
}
