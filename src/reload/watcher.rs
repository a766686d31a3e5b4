//! File-system watcher that triggers reloads.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::reload::channel::ReloadChannel;

/// Watches the served root and triggers the reload channel on change.
pub struct AssetWatcher {
    root: PathBuf,
    debounce: Duration,
    channel: ReloadChannel,
}

impl AssetWatcher {
    /// Create a new AssetWatcher.
    pub fn new(root: &Path, debounce: Duration, channel: ReloadChannel) -> Self {
        Self {
            root: root.to_path_buf(),
            debounce,
            channel,
        }
    }

    /// Start watching.
    ///
    /// Must be called within a Tokio runtime. Events are collapsed over the
    /// debounce window before one trigger is issued. Watching stops when the
    /// returned watcher is dropped.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let (tx, mut rx) = mpsc::unbounded_channel::<PathBuf>();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if event.kind.is_modify() || event.kind.is_create() || event.kind.is_remove() {
                        for path in event.paths {
                            let _ = tx.send(path);
                        }
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default(),
        )?;

        watcher.watch(&self.root, RecursiveMode::Recursive)?;

        let channel = self.channel;
        let debounce = self.debounce;
        tokio::spawn(async move {
            while let Some(path) = rx.recv().await {
                tokio::time::sleep(debounce).await;
                let mut changes = 1;
                while rx.try_recv().is_ok() {
                    changes += 1;
                }

                tracing::info!(path = %path.display(), changes, "Change detected, reloading");
                channel.trigger();
            }
        });

        tracing::info!(path = ?self.root, "Watching for changes");
        Ok(watcher)
    }
}
