//! The proxy HTTP service implementing hyper's `Service` trait.
//!
//! [`ProxyHttpService`] maps an HTTP request onto an [`AssetRequest`], runs it
//! through the [`AssetProxy`] and writes the [`NormalizedResponse`] back out:
//!
//! 1. Health check interception (`GET /_health`)
//! 2. Method check (`GET` and `HEAD` only)
//! 3. Path routing via [`route::resolve`](crate::route::resolve)
//! 4. The asset pipeline
//! 5. Base64 decoding of the normalized body
//! 6. Common response headers (`x-request-id`, `Server`)

use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use http::header::{HeaderName, HeaderValue};
use http::{Method, StatusCode};
use hyper::body::Incoming;
use hyper::service::Service;
use staticproxy_core::{AppConfig, AssetRequest, NormalizedResponse};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::body::ProxyResponseBody;
use crate::proxy::AssetProxy;
use crate::route;

/// Value of the `Server` response header.
pub const SERVER_NAME: &str = "staticproxy";

/// Per-deployment settings the HTTP layer adds to each request.
#[derive(Debug, Clone, Default)]
pub struct ProxyHttpConfig {
    /// Origin bucket.
    pub bucket: String,
    /// Application options forwarded with every request.
    pub app_config: AppConfig,
}

/// The proxy HTTP service.
#[derive(Debug, Clone)]
pub struct ProxyHttpService {
    proxy: Arc<AssetProxy>,
    config: Arc<ProxyHttpConfig>,
}

impl ProxyHttpService {
    /// Create a new service.
    #[must_use]
    pub fn new(proxy: AssetProxy, config: ProxyHttpConfig) -> Self {
        Self {
            proxy: Arc::new(proxy),
            config: Arc::new(config),
        }
    }

    /// Handle one request. The request body is never read.
    pub async fn handle(
        &self,
        parts: &http::request::Parts,
        request_id: &str,
    ) -> http::Response<ProxyResponseBody> {
        let response = self.process(parts, request_id).await;
        add_common_headers(response, request_id)
    }

    async fn process(
        &self,
        parts: &http::request::Parts,
        request_id: &str,
    ) -> http::Response<ProxyResponseBody> {
        let method = &parts.method;
        let path = parts.uri.path();
        debug!(%method, path, request_id, "processing request");

        if is_health_check(method, path) {
            return health_check_response();
        }
        if *method != Method::GET && *method != Method::HEAD {
            return plain_response(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed");
        }

        let Some(route) = route::resolve(path, self.config.app_config.spa) else {
            warn!(path, request_id, "request path is not valid UTF-8");
            return plain_response(StatusCode::BAD_REQUEST, "Invalid path");
        };

        let validator = parts
            .headers
            .get(http::header::IF_NONE_MATCH)
            .and_then(|v| v.to_str().ok())
            .map(ToOwned::to_owned);

        let request = AssetRequest {
            bucket: self.config.bucket.clone(),
            key: route.key,
            validator,
            is_proxy: route.is_proxy,
            app_config: self.config.app_config.clone(),
        };

        let normalized = self.proxy.respond(&request).await;
        info!(
            key = %request.key,
            is_proxy = request.is_proxy,
            status = normalized.status_code,
            request_id,
            "served asset"
        );
        into_http_response(normalized, *method == Method::HEAD)
    }
}

impl Service<http::Request<Incoming>> for ProxyHttpService {
    type Response = http::Response<ProxyResponseBody>;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, req: http::Request<Incoming>) -> Self::Future {
        let service = self.clone();
        Box::pin(async move {
            let request_id = Uuid::new_v4().to_string();
            let (parts, _body) = req.into_parts();
            Ok(service.handle(&parts, &request_id).await)
        })
    }
}

/// Write a normalized response onto the wire.
///
/// Base64 bodies are decoded first. Headers that are not valid HTTP are
/// dropped with a warning.
pub fn into_http_response(
    normalized: NormalizedResponse,
    head_only: bool,
) -> http::Response<ProxyResponseBody> {
    let payload = if normalized.is_base64_encoded {
        match normalized.decoded_body() {
            Ok(bytes) => bytes,
            Err(err) => {
                error!(error = %err, "normalized body is not valid base64");
                return plain_response(StatusCode::INTERNAL_SERVER_ERROR, "Invalid response body");
            }
        }
    } else {
        normalized.body.into_bytes()
    };

    let status =
        StatusCode::from_u16(normalized.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let body = if head_only {
        ProxyResponseBody::empty()
    } else {
        ProxyResponseBody::from_bytes(payload)
    };

    let mut response = http::Response::new(body);
    *response.status_mut() = status;
    let headers = response.headers_mut();
    for (name, value) in normalized.headers {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(&value),
        ) {
            (Ok(name), Ok(value)) => {
                headers.insert(name, value);
            }
            _ => warn!(header = %name, "dropping invalid response header"),
        }
    }
    response
}

fn plain_response(status: StatusCode, message: &'static str) -> http::Response<ProxyResponseBody> {
    let mut response = http::Response::new(ProxyResponseBody::from_bytes(message));
    *response.status_mut() = status;
    response.headers_mut().insert(
        http::header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    response
}

/// Check if the request is a health check probe.
fn is_health_check(method: &Method, path: &str) -> bool {
    *method == Method::GET && path == "/_health"
}

fn health_check_response() -> http::Response<ProxyResponseBody> {
    let mut response =
        http::Response::new(ProxyResponseBody::from_bytes(r#"{"status":"running"}"#));
    response.headers_mut().insert(
        http::header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    response
}

fn add_common_headers(
    mut response: http::Response<ProxyResponseBody>,
    request_id: &str,
) -> http::Response<ProxyResponseBody> {
    let headers = response.headers_mut();
    if let Ok(hv) = HeaderValue::from_str(request_id) {
        headers.insert("x-request-id", hv);
    }
    headers.insert(http::header::SERVER, HeaderValue::from_static(SERVER_NAME));
    response
}
