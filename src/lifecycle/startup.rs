//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the server from a configuration (fatal on invalid root)
//! - Start the file watcher when enabled
//! - Bind the listener, plain or TLS, and serve until a termination signal
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listeners start last (traffic only when ready)

use std::time::Duration;

use crate::config::{ConfigError, ServerConfig};
use crate::http::HttpServer;
use crate::lifecycle::{signals, Shutdown};
use crate::net::listener::{self, ListenerError};
use crate::net::tls::load_tls_config;
use crate::reload::AssetWatcher;

/// Error type for startup.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Listener(#[from] ListenerError),

    #[error("TLS error: {0}")]
    Tls(#[source] std::io::Error),

    #[error("Watch error: {0}")]
    Watch(#[from] notify::Error),

    #[error("Server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Run the server until SIGINT/SIGTERM.
pub async fn run(config: ServerConfig) -> Result<(), StartupError> {
    let server = HttpServer::new(config.clone())?;
    let shutdown = Shutdown::new();

    let _watcher = if config.watch.enabled.unwrap_or(config.reload) {
        let watcher = AssetWatcher::new(
            &config.root,
            Duration::from_millis(config.watch.debounce_ms),
            server.reload_channel(),
        );
        Some(watcher.run()?)
    } else {
        None
    };

    let serving = shutdown.subscribe();
    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        signals::termination().await;
        signal_shutdown.trigger();
    });

    match &config.tls {
        Some(tls) => {
            let rustls = load_tls_config(tls).await.map_err(StartupError::Tls)?;
            let listener = listener::bind_std(&config.listener)?;
            server
                .run_tls(listener, rustls, serving)
                .await
                .map_err(StartupError::Serve)?;
        }
        None => {
            let listener = listener::bind(&config.listener).await?;
            server.run(listener, serving).await.map_err(StartupError::Serve)?;
        }
    }

    Ok(())
}
