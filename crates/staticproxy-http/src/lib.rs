//! Asset proxy pipeline and HTTP surface.
//!
//! ```text
//! HTTP request ──> ProxyHttpService ──> route::resolve ──> AssetRequest
//!                                                              |
//!                                                              v
//!                        AssetProxy ── Mode::Sandbox ──> dyn SandboxReader
//!                             |
//!                        Mode::Live
//!                             v
//!   Manifest::resolve ──> OriginReader ──> ContentRewriter ──> normalize
//!                                                              |
//!                                                              v
//!                                                     NormalizedResponse
//! ```

pub mod body;
pub mod content;
pub mod normalize;
pub mod proxy;
pub mod rewrite;
pub mod route;
pub mod sandbox;
pub mod service;

pub use body::ProxyResponseBody;
pub use normalize::normalize;
pub use proxy::{AssetProxy, Pipeline};
pub use rewrite::ContentRewriter;
pub use sandbox::{FsSandbox, SandboxReader};
pub use service::{ProxyHttpConfig, ProxyHttpService};
