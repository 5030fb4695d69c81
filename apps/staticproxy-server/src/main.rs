//! staticproxy server: serves a static site out of an object store bucket.
//!
//! # Usage
//!
//! ```text
//! STATICPROXY_BUCKET=my-site-assets staticproxy-server
//! STATICPROXY_LOCAL=1 STATICPROXY_PUBLIC_DIR=./public staticproxy-server
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `STATICPROXY_LISTEN` | `0.0.0.0:3333` | Bind address |
//! | `STATICPROXY_BUCKET` | *(unset)* | Origin bucket, required in live mode |
//! | `STATICPROXY_MANIFEST` | `static.json` | Fingerprint manifest path |
//! | `STATICPROXY_PUBLIC_DIR` | `public` | Directory served in sandbox mode |
//! | `STATICPROXY_ENV` | *(unset)* | `testing` selects sandbox mode |
//! | `STATICPROXY_LOCAL` | *(unset)* | Any truthy value selects sandbox mode |
//! | `STATICPROXY_SPA` | `true` | Serve `index.html` for extension-less paths |
//! | `DEFAULT_REGION` | `us-east-1` | Object store region |
//! | `S3_ENDPOINT_URL` | *(unset)* | Custom object store endpoint (path-style) |
//! | `LOG_LEVEL` | `info` | Log level filter |
//! | `RUST_LOG` | *(unset)* | Fine-grained tracing filter (overrides `LOG_LEVEL`) |

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use aws_config::{BehaviorVersion, Region};
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as HttpConnBuilder;
use staticproxy_core::{AppConfig, Mode, ProxyConfig};
use staticproxy_http::{AssetProxy, FsSandbox, ProxyHttpConfig, ProxyHttpService};
use staticproxy_manifest::Manifest;
use staticproxy_origin::{MemoryOrigin, OriginStore, S3Origin};
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the tracing subscriber.
///
/// Uses `RUST_LOG` if set, otherwise falls back to the `LOG_LEVEL` config value.
fn init_tracing(log_level: &str) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level filter: {log_level}"))?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    Ok(())
}

/// Build the live origin client from the shared AWS configuration chain.
async fn build_s3_origin(config: &ProxyConfig) -> S3Origin {
    let shared = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(config.region.clone()))
        .load()
        .await;

    let mut builder = aws_sdk_s3::config::Builder::from(&shared);
    if let Some(endpoint) = &config.endpoint_url {
        info!(endpoint = %endpoint, "using custom object store endpoint");
        builder = builder.endpoint_url(endpoint).force_path_style(true);
    }
    S3Origin::new(aws_sdk_s3::Client::from_conf(builder.build()))
}

fn build_http_config(config: &ProxyConfig) -> ProxyHttpConfig {
    ProxyHttpConfig {
        bucket: config.bucket.clone(),
        app_config: AppConfig::builder().spa(config.spa).build(),
    }
}

async fn build_proxy(config: &ProxyConfig, manifest: Arc<Manifest>) -> AssetProxy {
    let sandbox = Arc::new(FsSandbox::new(&config.public_dir, Arc::clone(&manifest)));
    let store: Arc<dyn OriginStore> = match config.mode {
        Mode::Live => Arc::new(build_s3_origin(config).await),
        // never consulted in sandbox mode
        Mode::Sandbox => Arc::new(MemoryOrigin::new()),
    };
    AssetProxy::new(config.mode, manifest, store, sandbox)
}

/// Run the accept loop, serving connections until a shutdown signal is received.
async fn serve(listener: TcpListener, service: ProxyHttpService) -> Result<()> {
    let graceful = hyper_util::server::graceful::GracefulShutdown::new();
    let http = HttpConnBuilder::new(TokioExecutor::new());

    let shutdown = async {
        tokio::signal::ctrl_c().await.ok();
        info!("received shutdown signal, draining connections");
    };

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            result = listener.accept() => {
                let (stream, peer_addr) = match result {
                    Ok(conn) => conn,
                    Err(e) => {
                        warn!(error = %e, "failed to accept connection");
                        continue;
                    }
                };

                let conn = http.serve_connection(TokioIo::new(stream), service.clone());
                let conn = graceful.watch(conn.into_owned());

                tokio::spawn(async move {
                    if let Err(e) = conn.await {
                        error!(peer_addr = %peer_addr, error = %e, "connection error");
                    }
                });
            }

            () = &mut shutdown => {
                info!("shutting down gracefully");
                break;
            }
        }
    }

    graceful.shutdown().await;
    info!("all connections drained, exiting");

    Ok(())
}

/// Probe the health endpoint of a running server. Used as a container
/// health check.
async fn run_health_check(addr: &str) -> Result<()> {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    let stream = TcpStream::connect(addr)
        .await
        .with_context(|| format!("cannot connect to {addr}"))?;

    let (mut reader, mut writer) = stream.into_split();

    let request = format!("GET /_health HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n\r\n");
    writer.write_all(request.as_bytes()).await?;
    writer.shutdown().await?;

    let mut response = String::new();
    reader.read_to_string(&mut response).await?;

    if response.contains("200 OK") && response.contains(r#""status":"running""#) {
        Ok(())
    } else {
        anyhow::bail!("unhealthy response from {addr}")
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = ProxyConfig::from_env();

    if std::env::args().any(|a| a == "--health-check") {
        let addr = config.listen.replace("0.0.0.0", "127.0.0.1");
        let healthy = run_health_check(&addr).await.is_ok();
        std::process::exit(i32::from(!healthy));
    }

    init_tracing(&config.log_level)?;
    config.validate().context("invalid configuration")?;

    info!(
        listen = %config.listen,
        mode = %config.mode,
        bucket = %config.bucket,
        spa = config.spa,
        version = VERSION,
        "starting staticproxy server",
    );

    let manifest = Manifest::load_optional(&config.manifest_path)
        .with_context(|| format!("failed to load manifest {}", config.manifest_path))?;
    info!(path = %config.manifest_path, entries = manifest.len(), "manifest loaded");

    let proxy = build_proxy(&config, Arc::new(manifest)).await;
    let service = ProxyHttpService::new(proxy, build_http_config(&config));

    let addr: SocketAddr = config
        .listen
        .parse()
        .with_context(|| format!("invalid bind address: {}", config.listen))?;

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;

    info!(%addr, "listening for connections");

    serve(listener, service).await
}
