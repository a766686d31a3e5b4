//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, dispatch, classification)
//!     → events.rs (reload subscription stream)     [Subscription]
//!     → routing::resolver (file / fallback / 404)  [Asset]
//!     → response.rs (snippet, gzip, headers, access log)
//!     → mime.rs (content type, compressible set)
//!     → Send to client
//! ```

pub mod events;
pub mod mime;
pub mod response;
pub mod server;

pub use server::{HttpServer, ServerHandle};
