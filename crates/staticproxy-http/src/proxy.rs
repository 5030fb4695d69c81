//! The read-through pipeline.
//!
//! ```text
//! AssetProxy::respond(request)
//!   1. mode gate ──(sandbox)──> SandboxReader::read ──> response
//!   2. key resolution (captured requests go through the manifest)
//!   3. OriginReader::read(bucket, key, validator)
//!   4. ContentRewriter::maybe_rewrite
//!   5. normalize
//! ```

use std::sync::Arc;

use staticproxy_core::{AssetRequest, Mode, NormalizedResponse};
use staticproxy_manifest::Manifest;
use staticproxy_origin::{OriginReader, OriginStore};
use tracing::debug;

use crate::normalize::normalize;
use crate::rewrite::ContentRewriter;
use crate::sandbox::SandboxReader;

/// Steps 2 to 5 of the pipeline over a given origin.
///
/// Shared by the live proxy and the filesystem sandbox so both apply the
/// same resolution, rewrite and encoding rules.
#[derive(Debug, Clone)]
pub struct Pipeline {
    manifest: Arc<Manifest>,
    reader: OriginReader,
    rewriter: ContentRewriter,
}

impl Pipeline {
    /// Create a pipeline reading from `store`.
    #[must_use]
    pub fn new(manifest: Arc<Manifest>, store: Arc<dyn OriginStore>) -> Self {
        Self {
            rewriter: ContentRewriter::new(Arc::clone(&manifest)),
            reader: OriginReader::new(store),
            manifest,
        }
    }

    /// The storage key to read for `request`.
    ///
    /// Captured requests resolve through the manifest; direct fetches are
    /// passed through verbatim.
    #[must_use]
    pub fn storage_key<'a>(&'a self, request: &'a AssetRequest) -> &'a str {
        if request.is_captured() {
            self.manifest.resolve(&request.key)
        } else {
            &request.key
        }
    }

    /// Read, rewrite and normalize.
    pub async fn run(&self, request: &AssetRequest) -> NormalizedResponse {
        let key = self.storage_key(request);
        if key != request.key {
            debug!(requested = %request.key, resolved = %key, "resolved fingerprinted key");
        }
        self.run_with_key(request, key).await
    }

    /// Like [`Pipeline::run`], but reads `key` instead of resolving one.
    pub async fn run_with_key(&self, request: &AssetRequest, key: &str) -> NormalizedResponse {
        let outcome = self
            .reader
            .read(&request.bucket, key, request.validator.as_deref())
            .await;
        let outcome = self.rewriter.maybe_rewrite(outcome, request);
        normalize(request, outcome)
    }
}

/// The asset proxy: mode gate in front of the live pipeline.
#[derive(Debug, Clone)]
pub struct AssetProxy {
    mode: Mode,
    pipeline: Pipeline,
    sandbox: Arc<dyn SandboxReader>,
}

impl AssetProxy {
    /// Create a proxy.
    ///
    /// `store` is only consulted in [`Mode::Live`]; `sandbox` only in
    /// [`Mode::Sandbox`].
    #[must_use]
    pub fn new(
        mode: Mode,
        manifest: Arc<Manifest>,
        store: Arc<dyn OriginStore>,
        sandbox: Arc<dyn SandboxReader>,
    ) -> Self {
        Self {
            mode,
            pipeline: Pipeline::new(manifest, store),
            sandbox,
        }
    }

    /// The configured mode.
    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Produce the response for one request.
    pub async fn respond(&self, request: &AssetRequest) -> NormalizedResponse {
        match self.mode {
            Mode::Sandbox => self.sandbox.read(request).await,
            Mode::Live => self.pipeline.run(request).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use async_trait::async_trait;
    use bytes::Bytes;
    use staticproxy_origin::{OriginObject, StoreError};
    use tokio::sync::Mutex;

    use super::*;
    use crate::content::NO_CACHE;
    use crate::normalize::{CACHE_CONTROL, CONTENT_TYPE, ETAG};

    const CONTENTS: &str = "this is just some file contents\n";
    const TEMPLATED: &str = "this is just some file contents with an image \
        <img src=${STATIC('images/this-is-fine.gif')}>\n and another image \
        <img src=${arc.static('images/hold-onto-your-butts.gif')}> among other things \n";

    #[derive(Debug, Clone)]
    enum Behavior {
        Respond(OriginObject),
        Fail(StoreError),
    }

    /// Origin that records the last read and replays a canned result.
    #[derive(Debug)]
    struct RecordingOrigin {
        behavior: Behavior,
        last: Mutex<Option<(String, String, Option<String>)>>,
        stored: Bytes,
    }

    impl RecordingOrigin {
        fn respond(content_type: &str, body: &'static str) -> Arc<Self> {
            let body = Bytes::from_static(body.as_bytes());
            Arc::new(Self {
                behavior: Behavior::Respond(OriginObject {
                    content_type: content_type.to_owned(),
                    etag: "etagvalue".to_owned(),
                    body: body.clone(),
                }),
                last: Mutex::new(None),
                stored: body,
            })
        }

        fn fail(err: StoreError) -> Arc<Self> {
            Arc::new(Self {
                behavior: Behavior::Fail(err),
                last: Mutex::new(None),
                stored: Bytes::new(),
            })
        }

        async fn last(&self) -> (String, String, Option<String>) {
            self.last.lock().await.clone().expect("origin was called")
        }
    }

    #[async_trait]
    impl OriginStore for RecordingOrigin {
        async fn get_object(
            &self,
            bucket: &str,
            key: &str,
            validator: Option<&str>,
        ) -> Result<OriginObject, StoreError> {
            *self.last.lock().await = Some((
                bucket.to_owned(),
                key.to_owned(),
                validator.map(ToOwned::to_owned),
            ));
            match &self.behavior {
                Behavior::Respond(object) => Ok(object.clone()),
                Behavior::Fail(err) => Err(err.clone()),
            }
        }
    }

    /// Sandbox that tags its responses.
    #[derive(Debug)]
    struct TaggingSandbox;

    #[async_trait]
    impl SandboxReader for TaggingSandbox {
        async fn read(&self, request: &AssetRequest) -> NormalizedResponse {
            NormalizedResponse::text(
                299,
                HashMap::from([("X-Sandbox".to_owned(), "true".to_owned())]),
                format!("{}/{}", request.bucket, request.key),
            )
        }
    }

    fn manifest() -> Arc<Manifest> {
        Arc::new(Manifest::from_entries(HashMap::from([
            (
                "images/this-is-fine.gif".to_owned(),
                "images/this-is-fine-a1c3e5.gif".to_owned(),
            ),
            (
                "images/hold-onto-your-butts.gif".to_owned(),
                "images/hold-onto-your-butts-b2d4f6.gif".to_owned(),
            ),
            ("app.js".to_owned(), "app-a1c3e5.js".to_owned()),
            ("index.html".to_owned(), "index-b2d4f6.html".to_owned()),
        ])))
    }

    fn proxy(mode: Mode, manifest: Arc<Manifest>, origin: Arc<RecordingOrigin>) -> AssetProxy {
        AssetProxy::new(mode, manifest, origin, Arc::new(TaggingSandbox))
    }

    fn basic_read() -> AssetRequest {
        AssetRequest::builder()
            .bucket("a-bucket")
            .key("this-is-fine.gif")
            .validator("abc123")
            .is_proxy(true)
            .app_config(staticproxy_core::AppConfig::builder().spa(true).build())
            .build()
    }

    fn fingerprinted_read(key: &str, is_proxy: bool) -> AssetRequest {
        AssetRequest::builder()
            .bucket("a-fingerprinted-bucket")
            .key(key)
            .validator("abc123")
            .is_proxy(is_proxy)
            .build()
    }

    #[tokio::test]
    async fn test_should_route_every_request_to_sandbox_in_sandbox_mode() {
        let origin = RecordingOrigin::respond("image/gif", CONTENTS);
        let proxy = proxy(Mode::Sandbox, manifest(), Arc::clone(&origin));

        for req in [basic_read(), fingerprinted_read("index.html", false)] {
            let resp = proxy.respond(&req).await;
            assert_eq!(resp, TaggingSandbox.read(&req).await);
        }
        assert!(origin.last.lock().await.is_none(), "origin must not be read");
    }

    #[tokio::test]
    async fn test_should_return_304_when_origin_reports_not_modified() {
        let origin = RecordingOrigin::fail(StoreError::NotModified);
        let resp = proxy(Mode::Live, Arc::new(Manifest::empty()), origin)
            .respond(&basic_read())
            .await;
        assert_eq!(resp.status_code, 304);
        assert_eq!(resp.header(ETAG), Some("abc123"));
    }

    #[tokio::test]
    async fn test_should_return_500_on_unclassified_error() {
        let origin = RecordingOrigin::fail(StoreError::service("boom", "something exploded"));
        let resp = proxy(Mode::Live, Arc::new(Manifest::empty()), origin)
            .respond(&basic_read())
            .await;
        assert_eq!(resp.status_code, 500);
        assert!(resp.body.contains("boom"));
    }

    #[tokio::test]
    async fn test_should_return_404_on_missing_key() {
        let origin = RecordingOrigin::fail(StoreError::NoSuchKey {
            key: "this-is-fine.gif".to_owned(),
        });
        let resp = proxy(Mode::Live, Arc::new(Manifest::empty()), origin)
            .respond(&basic_read())
            .await;
        assert_eq!(resp.status_code, 404);
        assert!(resp.body.contains("NoSuchKey"));
    }

    #[tokio::test]
    async fn test_should_normalize_fetched_file() {
        let origin = RecordingOrigin::respond("image/gif", CONTENTS);
        let resp = proxy(Mode::Live, Arc::new(Manifest::empty()), Arc::clone(&origin))
            .respond(&basic_read())
            .await;
        assert_eq!(resp.status_code, 200);
        assert_eq!(resp.header(CONTENT_TYPE), Some("image/gif"));
        assert_eq!(resp.header(ETAG), Some("etagvalue"));
        assert!(!resp.header(CACHE_CONTROL).expect("cache").contains("no-cache"));
        assert!(resp.is_base64_encoded);
        assert_eq!(resp.decoded_body().expect("decode"), CONTENTS.as_bytes());
        assert_eq!(
            origin.last().await,
            (
                "a-bucket".to_owned(),
                "this-is-fine.gif".to_owned(),
                Some("abc123".to_owned())
            )
        );
    }

    #[tokio::test]
    async fn test_should_fall_back_to_unfingerprinted_key_on_manifest_miss() {
        let origin = RecordingOrigin::respond("image/gif", CONTENTS);
        let req = basic_read();
        proxy(Mode::Live, manifest(), Arc::clone(&origin))
            .respond(&req)
            .await;
        let (bucket, key, _) = origin.last().await;
        assert_eq!(bucket, req.bucket);
        assert_eq!(key, req.key);
    }

    #[tokio::test]
    async fn test_should_pass_fingerprinted_key_through_on_proxy_fetch() {
        let origin = RecordingOrigin::respond("image/gif", CONTENTS);
        let req = fingerprinted_read("images/this-is-fine-a1c3e5.gif", true);
        proxy(Mode::Live, manifest(), Arc::clone(&origin))
            .respond(&req)
            .await;
        let (bucket, key, _) = origin.last().await;
        assert_eq!(bucket, "a-fingerprinted-bucket");
        assert_eq!(key, "images/this-is-fine-a1c3e5.gif");
    }

    #[tokio::test]
    async fn test_should_resolve_captured_key_without_mutating_content() {
        let origin = RecordingOrigin::respond("text/html", CONTENTS);
        let resp = proxy(Mode::Live, manifest(), Arc::clone(&origin))
            .respond(&fingerprinted_read("index.html", false))
            .await;
        let (_, key, _) = origin.last().await;
        assert_eq!(key, "index-b2d4f6.html");
        assert!(!resp.is_base64_encoded);
        assert_eq!(resp.body, CONTENTS);
        assert_eq!(resp.header(CACHE_CONTROL), Some(NO_CACHE));
    }

    #[tokio::test]
    async fn test_should_replace_template_calls_on_proxy_fetch() {
        let origin = RecordingOrigin::respond("text/javascript", TEMPLATED);
        let resp = proxy(Mode::Live, manifest(), Arc::clone(&origin))
            .respond(&fingerprinted_read("app-a1c3e5.js", true))
            .await;
        let (_, key, _) = origin.last().await;
        assert_eq!(key, "app-a1c3e5.js");

        assert!(resp.is_base64_encoded);
        let body = String::from_utf8(resp.decoded_body().expect("decode")).expect("utf8");
        assert_ne!(body, TEMPLATED);
        assert!(body.contains("images/this-is-fine-a1c3e5.gif"));
        assert!(body.contains("images/hold-onto-your-butts-b2d4f6.gif"));
        assert_eq!(origin.stored.as_ref(), TEMPLATED.as_bytes());
    }

    #[tokio::test]
    async fn test_should_replace_template_calls_on_captured_fetch() {
        let origin = RecordingOrigin::respond("text/html", TEMPLATED);
        let resp = proxy(Mode::Live, manifest(), Arc::clone(&origin))
            .respond(&fingerprinted_read("index.html", false))
            .await;
        let (_, key, _) = origin.last().await;
        assert_eq!(key, "index-b2d4f6.html");

        assert!(!resp.is_base64_encoded);
        assert_ne!(resp.body, TEMPLATED);
        assert!(resp.body.contains("images/this-is-fine-a1c3e5.gif"));
        assert!(resp.body.contains("images/hold-onto-your-butts-b2d4f6.gif"));
        assert_eq!(origin.stored.as_ref(), TEMPLATED.as_bytes());
    }

    #[tokio::test]
    async fn test_should_not_rewrite_binary_content() {
        let origin = RecordingOrigin::respond("image/gif", TEMPLATED);
        let resp = proxy(Mode::Live, manifest(), origin)
            .respond(&fingerprinted_read("weird.gif", true))
            .await;
        assert_eq!(resp.decoded_body().expect("decode"), TEMPLATED.as_bytes());
    }
}
