//! Origin store backed by S3 (or any S3-compatible endpoint).

use async_trait::async_trait;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata};
use tracing::trace;

use crate::error::StoreError;
use crate::store::{OriginObject, OriginStore};

/// Content type assumed when the store does not report one.
const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Live object store client.
#[derive(Debug, Clone)]
pub struct S3Origin {
    client: aws_sdk_s3::Client,
}

impl S3Origin {
    /// Wrap a configured S3 client.
    #[must_use]
    pub fn new(client: aws_sdk_s3::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl OriginStore for S3Origin {
    async fn get_object(
        &self,
        bucket: &str,
        key: &str,
        validator: Option<&str>,
    ) -> Result<OriginObject, StoreError> {
        let output = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .set_if_none_match(validator.map(ToOwned::to_owned))
            .send()
            .await
            .map_err(|err| {
                let no_such_key = err
                    .as_service_error()
                    .is_some_and(aws_sdk_s3::operation::get_object::GetObjectError::is_no_such_key);
                classify_failure(
                    key,
                    &FailureSignal {
                        status: err.raw_response().map(|r| r.status().as_u16()),
                        code: err.code(),
                        message: err.message(),
                        no_such_key,
                    },
                )
                .unwrap_or_else(|| StoreError::Transport(DisplayErrorContext(&err).to_string()))
            })?;

        let content_type = output
            .content_type()
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_owned();
        let etag = output.e_tag().unwrap_or_default().to_owned();
        let body = output
            .body
            .collect()
            .await
            .map_err(|e| StoreError::Transport(format!("failed to read object body: {e}")))?
            .into_bytes();

        trace!(bucket, key, size = body.len(), "fetched object from s3");
        Ok(OriginObject {
            content_type,
            etag,
            body,
        })
    }
}

/// The identifying parts of a failed S3 call.
#[derive(Debug, Default)]
struct FailureSignal<'a> {
    status: Option<u16>,
    code: Option<&'a str>,
    message: Option<&'a str>,
    no_such_key: bool,
}

/// Map an S3 failure onto a [`StoreError`].
///
/// Returns `None` when the failure carries no status or code, i.e. it never
/// reached the service.
fn classify_failure(key: &str, signal: &FailureSignal<'_>) -> Option<StoreError> {
    if signal.status == Some(304) || signal.code == Some("NotModified") {
        return Some(StoreError::NotModified);
    }
    if signal.no_such_key || matches!(signal.code, Some("NoSuchKey" | "NotFound")) {
        return Some(StoreError::NoSuchKey {
            key: key.to_owned(),
        });
    }
    match (signal.code, signal.status) {
        (Some(code), _) => Some(StoreError::service(code, signal.message.unwrap_or(code))),
        (None, Some(status)) => Some(StoreError::service(
            format!("HTTP{status}"),
            signal
                .message
                .map_or_else(|| format!("unexpected status {status}"), ToOwned::to_owned),
        )),
        (None, None) => None,
    }
}
