//! servbot: development server for static sites and single-page apps.
//!
//! # Architecture Overview
//!
//! ```text
//!     Browser                 ┌──────────────────────────────────────────────┐
//!     ─────────── request ───▶│ net::listener ─▶ http::server (dispatch)      │
//!                             │                    │                         │
//!                             │        ┌───────────┴────────────┐            │
//!                             │        ▼                        ▼            │
//!                             │  reload::channel        routing::resolver    │
//!                             │  (event stream)                 │            │
//!                             │        ▲                        ▼            │
//!     ◀────────── response ───│        │               http::response        │
//!                             │  reload::watcher      (snippet, gzip, CORS)  │
//!                             │  (file changes)                              │
//!                             └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use servbot::config::loader::read_config;
use servbot::config::{DeliveryPolicy, ServerConfig, TlsConfig};
use servbot::lifecycle::startup;
use servbot::observability::logging;

#[derive(Parser)]
#[command(name = "servbot", version)]
#[command(about = "Development server with SPA fallback and live reload", long_about = None)]
struct Cli {
    /// Directory to serve
    root: Option<PathBuf>,

    /// TOML configuration file; flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Interface to bind
    #[arg(long)]
    host: Option<String>,

    /// Inject the reload script and serve the reload channel
    #[arg(short, long)]
    reload: bool,

    /// Fallback document for extensionless routes (e.g. index.html)
    #[arg(short, long)]
    fallback: Option<String>,

    /// Regular expression for paths that never get the fallback (repeatable)
    #[arg(short, long = "ignore")]
    ignores: Vec<String>,

    /// PEM certificate; enables HTTPS together with --key
    #[arg(long, requires = "key")]
    cert: Option<PathBuf>,

    /// PEM private key
    #[arg(long, requires = "cert")]
    key: Option<PathBuf>,

    /// Do not watch the root for changes
    #[arg(long)]
    no_watch: bool,

    /// Reload only the most recent subscriber per change
    #[arg(long)]
    lifo: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    /// Apply flags on top of a base configuration.
    fn apply(self, mut config: ServerConfig) -> ServerConfig {
        if let Some(root) = self.root {
            config.root = root;
        }
        if let Some(port) = self.port {
            config.listener.port = port;
        }
        if let Some(host) = self.host {
            config.listener.host = host;
        }
        if self.reload {
            config.reload = true;
        }
        if let Some(fallback) = self.fallback {
            config.fallback = fallback;
        }
        config.ignores.extend(self.ignores);
        if let (Some(cert_path), Some(key_path)) = (self.cert, self.key) {
            config.tls = Some(TlsConfig { cert_path, key_path });
        }
        if self.no_watch {
            config.watch.enabled = Some(false);
        }
        if self.lifo {
            config.reload_channel.delivery = DeliveryPolicy::Lifo;
        }
        if let Some(level) = self.log_level {
            config.observability.log_level = level;
        }
        config
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let base = match cli.config.as_deref().map(read_config).transpose() {
        Ok(base) => base.unwrap_or_default(),
        Err(e) => {
            logging::init("info", None);
            tracing::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    let config = cli.apply(base);

    logging::init(&config.observability.log_level, config.observability.color);
    tracing::info!("servbot v{} starting", env!("CARGO_PKG_VERSION"));

    match startup::run(config).await {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
