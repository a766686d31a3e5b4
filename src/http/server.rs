//! HTTP server setup and request dispatch.
//!
//! # Responsibilities
//! - Create the Axum Router with the dispatcher as its only handler
//! - Classify each request: reload subscription or asset
//! - Resolve assets, read bytes, hand off to the response emitter
//! - Serve plain or TLS listeners until shutdown
//! - Close reload subscribers before the listener is released
//!
//! # Request states
//! ```text
//! Received → Classified{Subscription | Asset} → Resolved → Responded
//! ```
//! Subscriptions never reach `Responded`; their stream stays open until the
//! reload channel closes it.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::Response,
    Router,
};
use axum_server::tls_rustls::RustlsConfig;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;

use crate::config::validation::{validate_config, ValidationError};
use crate::config::{ConfigError, ServerConfig};
use crate::http::events::subscription_response;
use crate::http::response::{emit, error_response};
use crate::lifecycle::Shutdown;
use crate::reload::{snippet, ReloadChannel, RELOAD_PATH};
use crate::routing::resolver::request_path;
use crate::routing::{ExclusionSet, ResolvedTarget, Resolver};

/// Time granted to open connections once a TLS server starts shutting down.
const TLS_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<Resolver>,
    /// Present only when reload is enabled.
    pub reload: Option<ReloadChannel>,
    pub snippet: &'static str,
    pub heartbeat: Option<Duration>,
}

/// How the dispatcher handles a request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classified {
    Subscription,
    Asset,
}

/// Classify a normalized request path.
pub fn classify(path: &str, reload_enabled: bool) -> Classified {
    if reload_enabled && path == RELOAD_PATH {
        Classified::Subscription
    } else {
        Classified::Asset
    }
}

/// HTTP server for the development site.
pub struct HttpServer {
    router: Router,
    config: ServerConfig,
    channel: ReloadChannel,
}

impl HttpServer {
    /// Validate the configuration and build the server.
    ///
    /// Fails when the root is not an existing directory or an ignore pattern
    /// does not compile.
    pub fn new(config: ServerConfig) -> Result<Self, ConfigError> {
        validate_config(&config).map_err(ConfigError::Validation)?;

        let root = std::fs::canonicalize(&config.root)?;
        let exclusions = ExclusionSet::compile(config.ignores.as_slice()).map_err(|source| {
            ConfigError::Validation(vec![ValidationError::IgnorePattern {
                pattern: config.ignores.join(", "),
                source,
            }])
        })?;

        let channel = ReloadChannel::new(config.reload_channel.delivery);
        let heartbeat = match config.reload_channel.heartbeat_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };

        let state = AppState {
            resolver: Arc::new(Resolver::new(root, &config.fallback, exclusions)),
            reload: config.reload.then(|| channel.clone()),
            snippet: snippet::injection(config.reload),
            heartbeat,
        };

        tracing::debug!(
            root = %state.resolver.root().display(),
            reload = config.reload,
            fallback = %config.fallback,
            "Server configured"
        );

        let router = Self::build_router(state);
        Ok(Self {
            router,
            config,
            channel,
        })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .fallback(dispatch)
            .with_state(state)
            .layer(TraceLayer::new_for_http())
    }

    /// Handle to the reload channel, for triggering reloads.
    pub fn reload_channel(&self) -> ReloadChannel {
        self.channel.clone()
    }

    /// The router, for driving requests without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve plain HTTP until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!("Server: {}://localhost:{}", self.config.scheme(), addr.port());

        let channel = self.channel.clone();
        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
                channel.shutdown_all();
            })
            .await?;

        tracing::info!("Server closed: {}://localhost:{}", self.config.scheme(), addr.port());
        Ok(())
    }

    /// Serve HTTPS on an already bound listener until `shutdown` fires.
    pub async fn run_tls(
        self,
        listener: std::net::TcpListener,
        tls: RustlsConfig,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!("Server: {}://localhost:{}", self.config.scheme(), addr.port());

        let handle = axum_server::Handle::new();
        let channel = self.channel.clone();
        let shutdown_handle = handle.clone();
        tokio::spawn(async move {
            let _ = shutdown.recv().await;
            tracing::info!("Shutdown signal received");
            channel.shutdown_all();
            shutdown_handle.graceful_shutdown(Some(TLS_DRAIN_TIMEOUT));
        });

        axum_server::from_tcp_rustls(listener, tls)
            .handle(handle)
            .serve(self.router.into_make_service())
            .await?;

        tracing::info!("Server closed: {}://localhost:{}", self.config.scheme(), addr.port());
        Ok(())
    }

    /// Start serving in the background.
    pub fn spawn(self, listener: TcpListener) -> Result<ServerHandle, io::Error> {
        let local_addr = listener.local_addr()?;
        let shutdown = Shutdown::new();
        let channel = self.channel.clone();
        let task = tokio::spawn(self.run(listener, shutdown.subscribe()));

        Ok(ServerHandle {
            local_addr,
            channel,
            shutdown,
            task,
        })
    }
}

/// Control surface of a running server.
pub struct ServerHandle {
    local_addr: SocketAddr,
    channel: ReloadChannel,
    shutdown: Shutdown,
    task: JoinHandle<Result<(), io::Error>>,
}

impl ServerHandle {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Trigger the reload channel. Returns the number of subscribers notified.
    pub fn reload(&self) -> usize {
        self.channel.trigger()
    }

    pub fn reload_channel(&self) -> &ReloadChannel {
        &self.channel
    }

    /// Stop accepting connections and wait for the server to finish.
    pub async fn close(self) -> Result<(), io::Error> {
        self.shutdown.trigger();
        self.task.await.map_err(io::Error::other)?
    }
}

/// Single entry point for every request.
async fn dispatch(State(state): State<AppState>, request: Request<Body>) -> Response {
    let path = request_path(request.uri().path());

    if let (Classified::Subscription, Some(channel)) =
        (classify(&path, state.reload.is_some()), &state.reload)
    {
        return subscription_response(channel.subscribe(), state.heartbeat);
    }

    match state.resolver.resolve(&path).await {
        ResolvedTarget::ConcreteFile { path: file, extension } => {
            match tokio::fs::read(&file).await {
                Ok(content) => emit(StatusCode::OK, &path, content, &extension, state.snippet).await,
                Err(err) => {
                    tracing::warn!(file = %file.display(), error = %err, "Read failed");
                    error_response(StatusCode::INTERNAL_SERVER_ERROR, &path)
                }
            }
        }
        ResolvedTarget::FallbackDocument { base_href, status } => {
            let Some(document) = state.resolver.fallback_document() else {
                return error_response(StatusCode::INTERNAL_SERVER_ERROR, &path);
            };
            match tokio::fs::read(&document).await {
                Ok(content) => {
                    let content = wrap_fallback(base_href.as_deref(), content);
                    emit(status, &path, content, "html", state.snippet).await
                }
                Err(err) => {
                    tracing::warn!(file = %document.display(), error = %err, "Fallback read failed");
                    error_response(StatusCode::INTERNAL_SERVER_ERROR, &path)
                }
            }
        }
        ResolvedTarget::NotFound => error_response(StatusCode::NOT_FOUND, &path),
    }
}

/// Prefix the fallback document with a `<base>` preamble when serving a deep link.
pub fn wrap_fallback(base_href: Option<&str>, document: Vec<u8>) -> Vec<u8> {
    let Some(href) = base_href else {
        return document;
    };

    let preamble = format!(
        r#"<!doctype html><meta charset="utf-8"/><base href="{}"/>"#,
        escape_attribute(href)
    );
    let mut wrapped = Vec::with_capacity(preamble.len() + document.len());
    wrapped.extend_from_slice(preamble.as_bytes());
    wrapped.extend_from_slice(&document);
    wrapped
}

fn escape_attribute(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            c => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header;
    use tower::ServiceExt;

    fn server(reload: bool, fallback: &str) -> (tempfile::TempDir, HttpServer) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<div id=app></div>").unwrap();
        std::fs::create_dir(dir.path().join("assets.v1")).unwrap();

        let mut config = ServerConfig::new(dir.path());
        config.reload = reload;
        config.fallback = fallback.to_string();
        let server = HttpServer::new(config).unwrap();
        (dir, server)
    }

    async fn get(router: Router, uri: &str) -> Response {
        router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify(RELOAD_PATH, true), Classified::Subscription);
        assert_eq!(classify(RELOAD_PATH, false), Classified::Asset);
        assert_eq!(classify("/index.html", true), Classified::Asset);
    }

    #[test]
    fn test_wrap_fallback() {
        assert_eq!(wrap_fallback(None, b"doc".to_vec()), b"doc");
        assert_eq!(
            wrap_fallback(Some("/a\"b/"), b"doc".to_vec()),
            br#"<!doctype html><meta charset="utf-8"/><base href="/a&quot;b/"/>doc"#
        );
    }

    #[test]
    fn test_invalid_root_is_fatal() {
        let config = ServerConfig::new("/no/such/directory");
        assert!(matches!(HttpServer::new(config), Err(ConfigError::Validation(_))));
    }

    #[tokio::test]
    async fn test_unreadable_target_is_server_error() {
        let (_dir, server) = server(false, "");
        let response = get(server.router(), "/assets.v1").await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_missing_fallback_document_is_server_error() {
        let (_dir, server) = server(false, "missing.html");
        let response = get(server.router(), "/about").await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"500");
    }

    #[tokio::test]
    async fn test_listener_path_is_asset_without_reload() {
        let (_dir, server) = server(false, "index.html");
        let response = get(server.router(), RELOAD_PATH).await;

        // Extensionless, so it falls back like any other route.
        assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/html");
    }

    #[tokio::test]
    async fn test_listener_path_subscribes_with_reload() {
        let (_dir, server) = server(true, "");
        let channel = server.reload_channel();
        let response = get(server.router(), RELOAD_PATH).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/event-stream");
        assert!(response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
        assert_eq!(channel.pending(), 1);
    }
}
