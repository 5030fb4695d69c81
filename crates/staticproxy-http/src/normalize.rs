//! Turning an origin outcome into the final response.
//!
//! | Outcome | Status | Body |
//! |---------|--------|------|
//! | `NotModified` | 304 | empty, `ETag` echoes the request validator |
//! | `NotFound` | 404 | text including the store identifier |
//! | `OriginError` | 500 | text including the error detail |
//! | `Success` | 200 | see [`normalize`] |

use std::collections::HashMap;

use staticproxy_core::{AssetRequest, NormalizedResponse};
use staticproxy_origin::{OriginObject, OriginOutcome};

use crate::content::{NO_CACHE, cache_control_for, is_text_like};

/// `Content-Type` header name as emitted.
pub const CONTENT_TYPE: &str = "Content-Type";
/// `ETag` header name as emitted.
pub const ETAG: &str = "ETag";
/// `Cache-Control` header name as emitted.
pub const CACHE_CONTROL: &str = "Cache-Control";

const ERROR_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// Build the response for an (already rewritten) outcome.
///
/// On success the body is plain text only for text content on a captured
/// request; everything else is base64 and flagged as such.
#[must_use]
pub fn normalize(request: &AssetRequest, outcome: OriginOutcome) -> NormalizedResponse {
    let status = outcome.status_code();
    match outcome {
        OriginOutcome::NotModified => {
            let mut headers = HashMap::new();
            if let Some(validator) = &request.validator {
                headers.insert(ETAG.to_owned(), validator.clone());
            }
            NormalizedResponse::text(status, headers, String::new())
        }
        OriginOutcome::NotFound { detail } => {
            NormalizedResponse::text(status, error_headers(), format!("Not found: {detail}"))
        }
        OriginOutcome::OriginError { detail } => {
            NormalizedResponse::text(status, error_headers(), format!("Origin error: {detail}"))
        }
        OriginOutcome::Success(object) => success(status, request, object),
    }
}

fn success(status: u16, request: &AssetRequest, object: OriginObject) -> NormalizedResponse {
    let app = &request.app_config;
    let mut headers: HashMap<String, String> = app
        .headers
        .iter()
        .filter(|(name, _)| !is_reserved_header(name))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect();
    let cache_control = app
        .cache_control
        .clone()
        .unwrap_or_else(|| cache_control_for(&object.content_type).to_owned());
    headers.insert(CACHE_CONTROL.to_owned(), cache_control);
    headers.insert(CONTENT_TYPE.to_owned(), object.content_type.clone());
    headers.insert(ETAG.to_owned(), object.etag);

    if request.is_captured() && is_text_like(&object.content_type) {
        if let Ok(text) = std::str::from_utf8(&object.body) {
            return NormalizedResponse::text(status, headers, text.to_owned());
        }
    }
    NormalizedResponse::binary(status, headers, &object.body)
}

/// Headers computed from the fetched object that app config cannot set.
fn is_reserved_header(name: &str) -> bool {
    [CONTENT_TYPE, ETAG, CACHE_CONTROL]
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(name))
}

fn error_headers() -> HashMap<String, String> {
    HashMap::from([
        (CONTENT_TYPE.to_owned(), ERROR_CONTENT_TYPE.to_owned()),
        (CACHE_CONTROL.to_owned(), NO_CACHE.to_owned()),
    ])
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use staticproxy_core::AppConfig;

    use super::*;

    const CONTENTS: &str = "this is just some file contents\n";

    fn request(is_proxy: bool) -> AssetRequest {
        AssetRequest::builder()
            .bucket("a-bucket")
            .key("this-is-fine.gif")
            .validator("abc123")
            .is_proxy(is_proxy)
            .build()
    }

    fn success_outcome(content_type: &str) -> OriginOutcome {
        OriginOutcome::Success(OriginObject {
            content_type: content_type.to_owned(),
            etag: "etagvalue".to_owned(),
            body: Bytes::from_static(CONTENTS.as_bytes()),
        })
    }

    #[test]
    fn test_should_echo_validator_on_not_modified() {
        let resp = normalize(&request(true), OriginOutcome::NotModified);
        assert_eq!(resp.status_code, 304);
        assert_eq!(resp.header(ETAG), Some("abc123"));
        assert!(resp.body.is_empty());
        assert!(!resp.is_base64_encoded);
    }

    #[test]
    fn test_should_include_identifier_in_not_found_body() {
        let outcome = OriginOutcome::NotFound {
            detail: "NoSuchKey: the specified key does not exist: x".to_owned(),
        };
        let resp = normalize(&request(true), outcome);
        assert_eq!(resp.status_code, 404);
        assert!(resp.body.contains("NoSuchKey"));
        assert_eq!(resp.header(CACHE_CONTROL), Some(NO_CACHE));
    }

    #[test]
    fn test_should_include_detail_in_error_body() {
        let outcome = OriginOutcome::OriginError {
            detail: "boom: boom".to_owned(),
        };
        let resp = normalize(&request(true), outcome);
        assert_eq!(resp.status_code, 500);
        assert!(resp.body.contains("boom"));
    }

    #[test]
    fn test_should_base64_binary_content() {
        let resp = normalize(&request(true), success_outcome("image/gif"));
        assert_eq!(resp.status_code, 200);
        assert_eq!(resp.header(CONTENT_TYPE), Some("image/gif"));
        assert_eq!(resp.header(ETAG), Some("etagvalue"));
        assert!(!resp.header(CACHE_CONTROL).expect("cache").contains("no-cache"));
        assert!(resp.is_base64_encoded);
        assert_eq!(resp.decoded_body().expect("decode"), CONTENTS.as_bytes());
    }

    #[test]
    fn test_should_base64_binary_content_even_when_captured() {
        let resp = normalize(&request(false), success_outcome("image/gif"));
        assert!(resp.is_base64_encoded);
        assert_eq!(resp.decoded_body().expect("decode"), CONTENTS.as_bytes());
    }

    #[test]
    fn test_should_base64_text_on_proxy_fetch() {
        let resp = normalize(&request(true), success_outcome("text/javascript"));
        assert!(resp.is_base64_encoded);
        assert_eq!(resp.decoded_body().expect("decode"), CONTENTS.as_bytes());
    }

    #[test]
    fn test_should_return_plain_text_on_captured_fetch() {
        let resp = normalize(&request(false), success_outcome("text/html"));
        assert!(!resp.is_base64_encoded);
        assert_eq!(resp.body, CONTENTS);
        assert_eq!(resp.header(CACHE_CONTROL), Some(NO_CACHE));
    }

    #[test]
    fn test_should_apply_app_config_overrides() {
        let mut req = request(true);
        req.app_config = AppConfig::builder()
            .cache_control("public, max-age=31536000, immutable")
            .headers(HashMap::from([
                ("X-Frame-Options".to_owned(), "DENY".to_owned()),
                (CONTENT_TYPE.to_owned(), "text/evil".to_owned()),
                ("content-type".to_owned(), "text/evil".to_owned()),
                ("etag".to_owned(), "\"forged\"".to_owned()),
                ("CACHE-CONTROL".to_owned(), "no-transform".to_owned()),
            ]))
            .build();
        let resp = normalize(&req, success_outcome("image/gif"));
        assert_eq!(
            resp.header(CACHE_CONTROL),
            Some("public, max-age=31536000, immutable")
        );
        assert_eq!(resp.header("X-Frame-Options"), Some("DENY"));
        assert_eq!(resp.header(CONTENT_TYPE), Some("image/gif"));
        assert_eq!(resp.header(ETAG), Some("etagvalue"));
        for name in [CONTENT_TYPE, ETAG, CACHE_CONTROL] {
            let copies = resp
                .headers
                .keys()
                .filter(|k| k.eq_ignore_ascii_case(name))
                .count();
            assert_eq!(copies, 1, "{name} must appear exactly once");
        }
    }

    #[test]
    fn test_should_base64_captured_text_that_is_not_utf8() {
        let outcome = OriginOutcome::Success(OriginObject {
            content_type: "text/html".to_owned(),
            etag: "etagvalue".to_owned(),
            body: Bytes::from_static(b"\xff\xfe<p>"),
        });
        let resp = normalize(&request(false), outcome);
        assert_eq!(resp.status_code, 200);
        assert!(resp.is_base64_encoded);
        assert_eq!(resp.decoded_body().expect("decode"), b"\xff\xfe<p>");
    }

    #[test]
    fn test_should_omit_etag_when_not_modified_without_validator() {
        let req = AssetRequest::builder().bucket("b").key("k").build();
        let resp = normalize(&req, OriginOutcome::NotModified);
        assert!(resp.header(ETAG).is_none());
    }
}
