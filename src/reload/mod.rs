//! Reload notification subsystem.
//!
//! # Data Flow
//! ```text
//! Browser (injected snippet.rs script)
//!     → GET /servbot-listener
//!     → channel.rs subscribe (pending set)
//!     → event stream held open
//!
//! File change (watcher.rs) or embedding code
//!     → channel.rs trigger
//!     → reload event written, subscription closed
//!     → browser reloads and subscribes again
//! ```
//!
//! # Design Decisions
//! - The pending set is owned by `ReloadChannel`, never global
//! - Broadcast delivery by default; LIFO single delivery is available

pub mod channel;
pub mod snippet;
pub mod watcher;

pub use channel::{ReloadChannel, ReloadEvent, Subscription, SubscriptionId};
pub use snippet::{RELOAD_PATH, RELOAD_SCRIPT};
pub use watcher::AssetWatcher;
