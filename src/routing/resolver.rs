//! Request path resolution.
//!
//! # Responsibilities
//! - Decode and normalize the URL path component
//! - Decide between a concrete file, the fallback document, or not-found
//! - Map directory routes to their index document
//!
//! # Design Decisions
//! - "Looks like a file" is purely syntactic: a `.` in the final segment
//! - Directory routes (trailing `/`) never receive the fallback document
//! - Dot segments are resolved lexically, so a path never escapes the root

use std::path::{Path, PathBuf};

use axum::http::StatusCode;
use percent_encoding::percent_decode_str;

use crate::routing::matcher::{ExclusionSet, PathMatcher};

/// Document looked up for directory routes.
pub const INDEX_DOCUMENT: &str = "index.html";

/// Outcome of resolving one request path. Computed per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedTarget {
    /// An existing file under the root.
    ConcreteFile { path: PathBuf, extension: String },
    /// Serve the fallback document. `base_href` is set when it must be wrapped
    /// in a `<base>` preamble.
    FallbackDocument {
        base_href: Option<String>,
        status: StatusCode,
    },
    /// Nothing servable at the resolved location.
    NotFound,
}

/// Resolves request paths against a served root.
#[derive(Debug)]
pub struct Resolver {
    root: PathBuf,
    fallback: Option<String>,
    exclusions: ExclusionSet,
}

impl Resolver {
    /// Create a resolver. An empty `fallback` disables fallback routing.
    pub fn new(root: impl Into<PathBuf>, fallback: &str, exclusions: ExclusionSet) -> Self {
        Self {
            root: root.into(),
            fallback: (!fallback.is_empty()).then(|| fallback.to_string()),
            exclusions,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Location of the fallback document on disk, if configured.
    pub fn fallback_document(&self) -> Option<PathBuf> {
        self.fallback.as_ref().map(|name| self.root.join(name))
    }

    /// Resolve a normalized request path (see [`request_path`]).
    pub async fn resolve(&self, path: &str) -> ResolvedTarget {
        let mut pathname = path.to_string();
        let is_directory_route = pathname.ends_with('/');

        if !has_extension(&pathname) {
            if self.fallback.is_some() && !is_directory_route && !self.exclusions.matches(&pathname) {
                return ResolvedTarget::FallbackDocument {
                    base_href: base_href(&pathname),
                    status: fallback_status(&pathname),
                };
            }

            if !is_directory_route {
                pathname.push('/');
            }
            pathname.push_str(INDEX_DOCUMENT);
        }

        let target = self.root.join(pathname.trim_start_matches('/'));
        match tokio::fs::try_exists(&target).await {
            Ok(true) => ResolvedTarget::ConcreteFile {
                extension: extension_of(&pathname).to_string(),
                path: target,
            },
            Ok(false) => ResolvedTarget::NotFound,
            // ENOTDIR, interior NUL and the like: still nothing to serve.
            Err(err) => {
                tracing::debug!(path = %target.display(), error = %err, "Existence check failed");
                ResolvedTarget::NotFound
            }
        }
    }
}

/// Decode the URL path component and resolve dot segments.
///
/// The result always starts with `/` and keeps a trailing `/` when the input
/// designates a directory.
pub fn request_path(raw: &str) -> String {
    let decoded = percent_decode_str(raw).decode_utf8_lossy();
    normalize_path(&decoded)
}

/// Lexically resolve `.`, `..` and empty segments.
pub fn normalize_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    let mut trailing = false;

    for segment in path.split('/') {
        trailing = matches!(segment, "" | "." | "..");
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }

    if segments.is_empty() {
        return "/".to_string();
    }

    let mut normalized = String::with_capacity(path.len());
    for segment in &segments {
        normalized.push('/');
        normalized.push_str(segment);
    }
    if trailing {
        normalized.push('/');
    }
    normalized
}

/// Whether the final path segment looks like a file name.
pub fn has_extension(path: &str) -> bool {
    path.rsplit('/').next().is_some_and(|last| last.contains('.'))
}

/// Text after the last `.` of the final segment.
pub fn extension_of(path: &str) -> &str {
    let last = path.rsplit('/').next().unwrap_or(path);
    last.rsplit_once('.').map(|(_, ext)| ext).unwrap_or("")
}

/// Status advertised for a fallback response: 301 marks a client-side route.
pub fn fallback_status(path: &str) -> StatusCode {
    if path == "/" {
        StatusCode::OK
    } else {
        StatusCode::MOVED_PERMANENTLY
    }
}

/// `<base>` target for a deep link, `None` at the root.
pub fn base_href(path: &str) -> Option<String> {
    if path == "/" {
        return None;
    }
    Some(format!("{}/", path.trim_end_matches('/')))
}
