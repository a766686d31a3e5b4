//! Local development server for static sites
//!
//! Serves a directory, optionally rewrites extensionless routes to a fallback
//! document, and pushes reload notifications to open browser tabs.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod reload;
pub mod routing;

pub use config::schema::ServerConfig;
pub use http::{HttpServer, ServerHandle};
pub use lifecycle::Shutdown;
pub use reload::ReloadChannel;
