//! Core types, configuration, and errors shared by the staticproxy crates.
//!
//! This crate holds the request and response shapes that flow through the
//! asset proxy pipeline ([`AssetRequest`] in, [`NormalizedResponse`] out),
//! the runtime [`Mode`] that decides whether reads go to the live origin or
//! the local sandbox, and the process-level [`ProxyConfig`].

mod config;
mod error;
mod types;

pub use config::{Mode, ProxyConfig};
pub use error::{ProxyError, ProxyResult};
pub use types::{AppConfig, AssetRequest, NormalizedResponse};
