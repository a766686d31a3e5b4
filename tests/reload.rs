//! Reload channel over real connections.

use std::time::Duration;

use reqwest::header::{CACHE_CONTROL, CONTENT_TYPE};
use reqwest::StatusCode;
use servbot::config::DeliveryPolicy;
use servbot::reload::RELOAD_PATH;
use servbot::ServerHandle;
use tokio::time::timeout;

mod common;

const CONNECTED: &str = "event: connected\ndata: ready\n\n";
const RELOAD: &str = "event: message\ndata: reload\n\n";
const WAIT: Duration = Duration::from_secs(5);

/// An open event stream and everything read from it so far.
struct Listener {
    response: reqwest::Response,
    received: String,
}

impl Listener {
    async fn open(server: &ServerHandle) -> Self {
        let response = common::client()
            .get(common::url(server, RELOAD_PATH))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], "text/event-stream");
        assert_eq!(response.headers()[CACHE_CONTROL], "no-cache");

        let mut listener = Self {
            response,
            received: String::new(),
        };
        listener.read_until(CONNECTED).await;
        listener
    }

    async fn read_until(&mut self, needle: &str) {
        while !self.received.contains(needle) {
            match timeout(WAIT, self.response.chunk()).await.unwrap().unwrap() {
                Some(chunk) => self.received.push_str(std::str::from_utf8(&chunk).unwrap()),
                None => break,
            }
        }
    }

    /// Read until the server closes the stream.
    async fn finish(mut self) -> String {
        while let Some(chunk) = timeout(WAIT, self.response.chunk()).await.unwrap().unwrap() {
            self.received.push_str(std::str::from_utf8(&chunk).unwrap());
        }
        self.received
    }
}

async fn reload_server(policy: DeliveryPolicy) -> (tempfile::TempDir, ServerHandle) {
    let root = common::site(&[("index.html", b"<h1>hi</h1>")]);
    let mut config = common::config(root.path());
    config.reload = true;
    config.reload_channel.delivery = policy;
    let server = common::start(config).await;
    (root, server)
}

#[tokio::test]
async fn test_trigger_without_subscribers_is_noop() {
    let (_root, server) = reload_server(DeliveryPolicy::Broadcast).await;
    assert_eq!(server.reload(), 0);
    server.close().await.unwrap();
}

#[tokio::test]
async fn test_broadcast_reaches_every_subscriber() {
    let (_root, server) = reload_server(DeliveryPolicy::Broadcast).await;

    let first = Listener::open(&server).await;
    let second = Listener::open(&server).await;
    assert_eq!(server.reload_channel().pending(), 2);

    assert_eq!(server.reload(), 2);

    let expected = format!("{}{}", CONNECTED, RELOAD);
    assert_eq!(first.finish().await, expected);
    assert_eq!(second.finish().await, expected);
    assert_eq!(server.reload_channel().pending(), 0);

    server.close().await.unwrap();
}

#[tokio::test]
async fn test_lifo_reaches_latest_subscriber_only() {
    let (_root, server) = reload_server(DeliveryPolicy::Lifo).await;

    let mut older = Listener::open(&server).await;
    let newer = Listener::open(&server).await;

    assert_eq!(server.reload(), 1);
    assert_eq!(newer.finish().await, format!("{}{}", CONNECTED, RELOAD));
    assert_eq!(server.reload_channel().pending(), 1);

    assert_eq!(server.reload(), 1);
    older.read_until(RELOAD).await;
    assert_eq!(older.finish().await, format!("{}{}", CONNECTED, RELOAD));

    server.close().await.unwrap();
}

#[tokio::test]
async fn test_close_ends_subscriptions_without_reload() {
    let (_root, server) = reload_server(DeliveryPolicy::Broadcast).await;

    let listener = Listener::open(&server).await;
    let channel = server.reload_channel().clone();

    timeout(WAIT, server.close()).await.unwrap().unwrap();

    assert_eq!(listener.finish().await, CONNECTED);
    assert_eq!(channel.pending(), 0);
}

#[tokio::test]
async fn test_listener_path_is_ordinary_without_reload() {
    let root = common::site(&[("index.html", b"<h1>hi</h1>")]);
    let server = common::start(common::config(root.path())).await;

    let res = common::client()
        .get(common::url(&server, RELOAD_PATH))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    server.close().await.unwrap();
}
