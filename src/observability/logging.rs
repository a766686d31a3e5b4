//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber
//! - Emit one access line per response, color-coded by status
//!
//! # Design Decisions
//! - `RUST_LOG` overrides the configured level
//! - Color is auto-detected from stdout unless configured

use std::fmt;
use std::io::IsTerminal;
use std::sync::atomic::{AtomicBool, Ordering};

use axum::http::StatusCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static COLOR: AtomicBool = AtomicBool::new(false);

/// Install the global subscriber. Later calls are ignored.
pub fn init(log_level: &str, color: Option<bool>) {
    let color = color.unwrap_or_else(|| std::io::stdout().is_terminal());
    set_color(color);

    let _ = tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("servbot={log_level},tower_http={log_level}").into()),
        )
        .with(tracing_subscriber::fmt::layer().with_ansi(color))
        .try_init();
}

pub fn set_color(enabled: bool) {
    COLOR.store(enabled, Ordering::Relaxed);
}

/// Status code rendered red for errors and green otherwise.
#[derive(Debug, Clone, Copy)]
pub struct PaintedStatus {
    status: StatusCode,
    color: bool,
}

impl PaintedStatus {
    pub fn new(status: StatusCode, color: bool) -> Self {
        Self { status, color }
    }
}

impl fmt::Display for PaintedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = self.status.as_u16();
        if !self.color {
            return write!(f, "{}", code);
        }
        let paint = if code >= 400 { "31" } else { "32" };
        write!(f, "\x1b[1;{}m{}\x1b[0m", paint, code)
    }
}

/// Access log line for an emitted response.
pub fn log_response(status: StatusCode, path: &str) {
    let painted = PaintedStatus::new(status, COLOR.load(Ordering::Relaxed));
    if status.is_client_error() || status.is_server_error() {
        tracing::warn!(target: "servbot::access", "-> {} - {}", painted, path);
    } else {
        tracing::info!(target: "servbot::access", "-> {} - {}", painted, path);
    }
}
