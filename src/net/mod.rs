//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! ListenerConfig
//!     → listener.rs (bind host:port)
//!     → tls.rs (optional rustls acceptor from PEM files)
//!     → Hand off to HTTP layer
//! ```
//!
//! # Design Decisions
//! - TLS is optional; presence of credentials selects HTTPS
//! - Binding happens before any request handling starts

pub mod listener;
pub mod tls;
