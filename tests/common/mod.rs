//! Shared utilities for integration testing.

use std::io::Read;
use std::path::Path;

use flate2::read::GzDecoder;
use servbot::{HttpServer, ServerConfig, ServerHandle};
use tempfile::TempDir;
use tokio::net::TcpListener;

/// Create a temporary site with the given files (relative path, contents).
pub fn site(files: &[(&str, &[u8])]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (path, contents) in files {
        let target = dir.path().join(path);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(target, contents).unwrap();
    }
    dir
}

/// Start a server on an ephemeral port.
pub async fn start(config: ServerConfig) -> ServerHandle {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    HttpServer::new(config).unwrap().spawn(listener).unwrap()
}

/// Configuration for `root` with everything else defaulted.
pub fn config(root: &Path) -> ServerConfig {
    ServerConfig::new(root)
}

/// Client that neither decompresses, follows redirects, nor uses a proxy.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

pub fn url(server: &ServerHandle, path: &str) -> String {
    format!("http://{}{}", server.local_addr(), path)
}

/// Body as delivered, decompressed when gzip-encoded.
#[allow(dead_code)]
pub async fn body(response: reqwest::Response) -> Vec<u8> {
    let gzipped = response
        .headers()
        .get(reqwest::header::CONTENT_ENCODING)
        .is_some_and(|v| v == "gzip");
    let bytes = response.bytes().await.unwrap();
    if gzipped {
        gunzip(&bytes)
    } else {
        bytes.to_vec()
    }
}

pub fn gunzip(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    GzDecoder::new(data).read_to_end(&mut out).unwrap();
    out
}
