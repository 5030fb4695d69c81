//! Manifest-driven rewriting of fetched bodies.

use std::borrow::Cow;
use std::sync::Arc;

use bytes::Bytes;
use staticproxy_core::AssetRequest;
use staticproxy_manifest::Manifest;
use staticproxy_origin::{OriginObject, OriginOutcome};
use tracing::{debug, trace};

use crate::content::is_text_like;

/// Replaces asset directives in text bodies with fingerprinted keys.
#[derive(Debug, Clone)]
pub struct ContentRewriter {
    manifest: Arc<Manifest>,
}

impl ContentRewriter {
    /// Create a rewriter over a shared manifest.
    #[must_use]
    pub fn new(manifest: Arc<Manifest>) -> Self {
        Self { manifest }
    }

    /// Rewrite the body of a successful outcome when it is eligible.
    ///
    /// Other outcomes pass through untouched.
    #[must_use]
    pub fn maybe_rewrite(&self, outcome: OriginOutcome, request: &AssetRequest) -> OriginOutcome {
        match outcome {
            OriginOutcome::Success(object) => {
                OriginOutcome::Success(self.rewrite_object(object, request))
            }
            other => other,
        }
    }

    /// Whether `object` is a rewrite candidate for `request`.
    ///
    /// Text types always are; captured requests are regardless of type, as
    /// long as the body decodes as UTF-8.
    #[must_use]
    pub fn is_eligible(content_type: &str, request: &AssetRequest) -> bool {
        request.is_captured() || is_text_like(content_type)
    }

    /// The rewritten object, or the same object when nothing changed.
    ///
    /// Never mutates `object.body`; a rewrite allocates a new buffer.
    fn rewrite_object(&self, object: OriginObject, request: &AssetRequest) -> OriginObject {
        if !Self::is_eligible(&object.content_type, request) {
            trace!(content_type = %object.content_type, "body not eligible for rewriting");
            return object;
        }

        let rewritten = match std::str::from_utf8(&object.body) {
            Ok(text) => match self.manifest.rewrite(text) {
                Cow::Borrowed(_) => None,
                Cow::Owned(text) => Some(text),
            },
            Err(_) => {
                debug!(
                    content_type = %object.content_type,
                    "body is not valid UTF-8, skipping rewrite"
                );
                None
            }
        };

        match rewritten {
            Some(text) => OriginObject {
                body: Bytes::from(text),
                ..object
            },
            None => object,
        }
    }
}
