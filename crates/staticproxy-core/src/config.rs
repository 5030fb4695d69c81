//! Configuration management for staticproxy.
//!
//! All configuration is driven by environment variables. The two sandbox
//! signals (`STATICPROXY_ENV=testing` and `STATICPROXY_LOCAL`) are read here
//! once and turned into an explicit [`Mode`], which is then injected into the
//! pipeline instead of being re-read per request.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;
use typed_builder::TypedBuilder;

use crate::error::{ProxyError, ProxyResult};

/// Where reads are served from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Reads go to the live object store.
    #[default]
    Live,
    /// Reads are delegated to the local sandbox reader.
    Sandbox,
}

impl Mode {
    /// Canonical lowercase name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::Sandbox => "sandbox",
        }
    }

    /// Derive the mode from the two independent environment signals.
    ///
    /// Either one is enough to select [`Mode::Sandbox`].
    #[must_use]
    pub fn from_signals(env: Option<&str>, local: Option<&str>) -> Self {
        let testing = env.is_some_and(|v| v.eq_ignore_ascii_case("testing"));
        let local =
            local.is_some_and(|v| !v.is_empty() && v != "0" && !v.eq_ignore_ascii_case("false"));
        if testing || local {
            Self::Sandbox
        } else {
            Self::Live
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = ProxyError;

    fn from_str(s: &str) -> ProxyResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "live" => Ok(Self::Live),
            "sandbox" => Ok(Self::Sandbox),
            _ => Err(ProxyError::Config(format!("unknown mode: {s}"))),
        }
    }
}

/// Process-level proxy configuration.
///
/// # Examples
///
/// ```
/// use staticproxy_core::{Mode, ProxyConfig};
///
/// let config = ProxyConfig::builder().bucket("assets".into()).build();
/// assert_eq!(config.mode, Mode::Live);
/// assert_eq!(config.manifest_path, "static.json");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct ProxyConfig {
    /// Bind address for the HTTP server.
    #[builder(default = String::from("0.0.0.0:3333"))]
    pub listen: String,

    /// Bucket that holds the static assets.
    #[builder(default)]
    pub bucket: String,

    /// Path to the optional fingerprint manifest.
    #[builder(default = String::from("static.json"))]
    pub manifest_path: String,

    /// Directory served by the sandbox reader.
    #[builder(default = String::from("public"))]
    pub public_dir: String,

    /// Log level filter string.
    #[builder(default = String::from("info"))]
    pub log_level: String,

    /// Live origin or local sandbox.
    #[builder(default)]
    pub mode: Mode,

    /// Whether extension-less paths fall back to the entry page.
    #[builder(default = true)]
    pub spa: bool,

    /// AWS region for the origin client.
    #[builder(default = String::from("us-east-1"))]
    pub region: String,

    /// Custom object store endpoint (e.g. a local S3 emulator).
    #[builder(default)]
    pub endpoint_url: Option<String>,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl ProxyConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `STATICPROXY_LISTEN` | `0.0.0.0:3333` |
    /// | `STATICPROXY_BUCKET` | *(empty)* |
    /// | `STATICPROXY_MANIFEST` | `static.json` |
    /// | `STATICPROXY_PUBLIC_DIR` | `public` |
    /// | `LOG_LEVEL` | `info` |
    /// | `STATICPROXY_ENV` / `STATICPROXY_LOCAL` | live mode |
    /// | `STATICPROXY_SPA` | `true` |
    /// | `DEFAULT_REGION` | `us-east-1` |
    /// | `S3_ENDPOINT_URL` | *(unset)* |
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(v) = std::env::var("STATICPROXY_LISTEN") {
            config.listen = v;
        }
        if let Ok(v) = std::env::var("STATICPROXY_BUCKET") {
            config.bucket = v;
        }
        if let Ok(v) = std::env::var("STATICPROXY_MANIFEST") {
            config.manifest_path = v;
        }
        if let Ok(v) = std::env::var("STATICPROXY_PUBLIC_DIR") {
            config.public_dir = v;
        }
        if let Ok(v) = std::env::var("LOG_LEVEL") {
            config.log_level = v;
        }
        if let Ok(v) = std::env::var("STATICPROXY_SPA") {
            config.spa = parse_bool(&v);
        }
        if let Ok(v) = std::env::var("DEFAULT_REGION") {
            config.region = v;
        }
        if let Ok(v) = std::env::var("S3_ENDPOINT_URL") {
            config.endpoint_url = Some(v);
        }

        let env = std::env::var("STATICPROXY_ENV").ok();
        let local = std::env::var("STATICPROXY_LOCAL").ok();
        config.mode = Mode::from_signals(env.as_deref(), local.as_deref());

        config
    }

    /// Check that the configuration can serve requests.
    ///
    /// Live mode needs a bucket; sandbox mode needs a public directory.
    pub fn validate(&self) -> ProxyResult<()> {
        match self.mode {
            Mode::Live if self.bucket.is_empty() => Err(ProxyError::Config(
                "STATICPROXY_BUCKET must be set in live mode".to_owned(),
            )),
            Mode::Sandbox if self.public_dir.is_empty() => Err(ProxyError::Config(
                "STATICPROXY_PUBLIC_DIR must not be empty in sandbox mode".to_owned(),
            )),
            _ => {
                if self.mode == Mode::Sandbox && !self.bucket.is_empty() {
                    warn!(bucket = %self.bucket, "bucket is ignored in sandbox mode");
                }
                Ok(())
            }
        }
    }
}

/// Parse a string as a boolean, accepting `"1"` and `"true"` (case-insensitive).
fn parse_bool(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}
