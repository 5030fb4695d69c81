//! Request and response shapes for the asset proxy pipeline.

use std::collections::HashMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

/// Per-application settings that shape how responses are produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    /// Whether the application is a single-page app (extension-less paths
    /// fall back to the entry page).
    #[builder(default)]
    pub spa: bool,

    /// Overrides the computed `Cache-Control` directive on successful reads.
    #[builder(default, setter(strip_option, into))]
    pub cache_control: Option<String>,

    /// Extra headers added to every successful response. Entries named
    /// `Content-Type`, `ETag` or `Cache-Control` (in any case) are ignored.
    #[builder(default)]
    pub headers: HashMap<String, String>,
}

/// A single logical asset read.
///
/// # Examples
///
/// ```
/// use staticproxy_core::AssetRequest;
///
/// let req = AssetRequest::builder()
///     .bucket("a-bucket")
///     .key("this-is-fine.gif")
///     .validator("abc123")
///     .is_proxy(true)
///     .build();
/// assert!(req.is_proxy);
/// assert_eq!(req.validator.as_deref(), Some("abc123"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct AssetRequest {
    /// Bucket holding the asset.
    #[builder(setter(into))]
    pub bucket: String,

    /// Requested key, possibly a logical (non-fingerprinted) path.
    #[builder(setter(into))]
    pub key: String,

    /// Cache validator from the client (`If-None-Match`).
    #[builder(default, setter(strip_option, into))]
    pub validator: Option<String>,

    /// `true` for a direct asset fetch, `false` for a captured request whose
    /// key goes through the manifest and whose body is always rewritable.
    #[builder(default = true)]
    pub is_proxy: bool,

    /// Application settings.
    #[builder(default)]
    pub app_config: AppConfig,
}

impl AssetRequest {
    /// Whether this is a captured (entry page) request.
    #[must_use]
    pub fn is_captured(&self) -> bool {
        !self.is_proxy
    }
}

/// The terminal response produced by the proxy.
///
/// Serializes as `{statusCode, headers, body, isBase64Encoded}`, the shape
/// HTTP adapters consume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedResponse {
    /// HTTP status code.
    pub status_code: u16,
    /// Response headers, keys as emitted.
    pub headers: HashMap<String, String>,
    /// Body, plain text or base64 depending on `is_base64_encoded`.
    pub body: String,
    /// Whether `body` is base64.
    pub is_base64_encoded: bool,
}

impl NormalizedResponse {
    /// Build a plain-text response.
    #[must_use]
    pub fn text(status_code: u16, headers: HashMap<String, String>, body: String) -> Self {
        Self {
            status_code,
            headers,
            body,
            is_base64_encoded: false,
        }
    }

    /// Build a response whose body is the base64 encoding of `data`.
    #[must_use]
    pub fn binary(status_code: u16, headers: HashMap<String, String>, data: &[u8]) -> Self {
        Self {
            status_code,
            headers,
            body: BASE64_STANDARD.encode(data),
            is_base64_encoded: true,
        }
    }

    /// Look up a header by exact name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    /// Decode the body into raw bytes according to `is_base64_encoded`.
    pub fn decoded_body(&self) -> Result<Vec<u8>, base64::DecodeError> {
        if self.is_base64_encoded {
            BASE64_STANDARD.decode(&self.body)
        } else {
            Ok(self.body.clone().into_bytes())
        }
    }
}
