//! TCP listener binding.
//!
//! # Responsibilities
//! - Bind to the configured host and port
//! - Provide a Tokio listener for plain HTTP and a std listener for TLS

use std::net::SocketAddr;

use tokio::net::TcpListener;

use crate::config::ListenerConfig;

/// Error type for listener operations.
#[derive(Debug, thiserror::Error)]
pub enum ListenerError {
    /// Failed to bind to address.
    #[error("Failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },
}

impl ListenerError {
    fn bind(config: &ListenerConfig, source: std::io::Error) -> Self {
        ListenerError::Bind {
            address: config.bind_address(),
            source,
        }
    }
}

/// Bind a Tokio listener.
pub async fn bind(config: &ListenerConfig) -> Result<TcpListener, ListenerError> {
    let listener = TcpListener::bind(config.bind_address())
        .await
        .map_err(|e| ListenerError::bind(config, e))?;
    log_bound(listener.local_addr());
    Ok(listener)
}

/// Bind a non-blocking std listener, as expected by the TLS acceptor.
pub fn bind_std(config: &ListenerConfig) -> Result<std::net::TcpListener, ListenerError> {
    let listener = std::net::TcpListener::bind(config.bind_address())
        .map_err(|e| ListenerError::bind(config, e))?;
    listener
        .set_nonblocking(true)
        .map_err(|e| ListenerError::bind(config, e))?;
    log_bound(listener.local_addr());
    Ok(listener)
}

fn log_bound(addr: std::io::Result<SocketAddr>) {
    if let Ok(addr) = addr {
        tracing::debug!(address = %addr, "Listener bound");
    }
}
