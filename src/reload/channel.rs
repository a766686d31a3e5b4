//! Pending reload subscribers and their delivery.
//!
//! # Responsibilities
//! - Own the ordered set of pending subscriptions
//! - Deliver a reload event on trigger and close the delivered subscriptions
//! - Close every subscription without a payload on shutdown
//!
//! # Design Decisions
//! - A subscriber is the sending half of an unbounded channel; the receiving half
//!   backs the streaming response. Dropping the sender ends the response.
//! - Removal and send happen under one lock, so a subscriber is delivered at most once
//! - Subscribers whose peers went away are pruned whenever the set is touched

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;

use crate::config::DeliveryPolicy;

/// Event pushed to a subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadEvent {
    /// Written once, as soon as the subscription is opened.
    Connected,
    /// The page should reload itself.
    Reload,
}

impl ReloadEvent {
    /// Event name on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            ReloadEvent::Connected => "connected",
            ReloadEvent::Reload => "message",
        }
    }

    /// Event payload on the wire.
    pub fn data(&self) -> &'static str {
        match self {
            ReloadEvent::Connected => "ready",
            ReloadEvent::Reload => "reload",
        }
    }
}

/// Opaque identifier for one subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// Receiving side of a subscription, handed to the streaming response.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriptionId,
    events: mpsc::UnboundedReceiver<ReloadEvent>,
}

impl Subscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Next event, or `None` once the channel has closed this subscription.
    pub async fn recv(&mut self) -> Option<ReloadEvent> {
        self.events.recv().await
    }

    pub fn into_receiver(self) -> mpsc::UnboundedReceiver<ReloadEvent> {
        self.events
    }
}

#[derive(Debug)]
struct Subscriber {
    id: SubscriptionId,
    tx: mpsc::UnboundedSender<ReloadEvent>,
}

#[derive(Debug)]
struct Inner {
    policy: DeliveryPolicy,
    next_id: AtomicU64,
    pending: Mutex<Vec<Subscriber>>,
}

/// Reload channel shared between the dispatcher and whoever triggers reloads.
///
/// Cloning is cheap; all clones share the same pending set.
#[derive(Debug, Clone)]
pub struct ReloadChannel {
    inner: Arc<Inner>,
}

impl ReloadChannel {
    pub fn new(policy: DeliveryPolicy) -> Self {
        Self {
            inner: Arc::new(Inner {
                policy,
                next_id: AtomicU64::new(1),
                pending: Mutex::new(Vec::new()),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Subscriber>> {
        self.inner.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Open a subscription. The `Connected` event is already queued on it.
    pub fn subscribe(&self) -> Subscription {
        let id = SubscriptionId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        let (tx, events) = mpsc::unbounded_channel();
        // Receiver is alive, send cannot fail.
        let _ = tx.send(ReloadEvent::Connected);

        let mut pending = self.lock();
        pending.retain(|s| !s.tx.is_closed());
        pending.push(Subscriber { id, tx });
        tracing::debug!(subscription = %id, pending = pending.len(), "Reload subscriber added");

        Subscription { id, events }
    }

    /// Deliver a reload event according to the delivery policy.
    ///
    /// Returns the number of subscribers notified. With nothing pending this
    /// is a no-op returning 0.
    pub fn trigger(&self) -> usize {
        let mut pending = self.lock();
        pending.retain(|s| !s.tx.is_closed());

        let delivered: Vec<Subscriber> = match self.inner.policy {
            DeliveryPolicy::Broadcast => pending.drain(..).collect(),
            DeliveryPolicy::Lifo => pending.pop().into_iter().collect(),
        };

        let mut notified = 0;
        for subscriber in delivered {
            if subscriber.tx.send(ReloadEvent::Reload).is_ok() {
                notified += 1;
            }
            tracing::debug!(subscription = %subscriber.id, "Reload delivered");
            // Dropping the sender closes the stream.
        }

        if notified > 0 {
            tracing::info!(notified, remaining = pending.len(), "Reload triggered");
        }
        notified
    }

    /// Close every pending subscription without sending a reload.
    ///
    /// Returns the number of subscriptions closed.
    pub fn shutdown_all(&self) -> usize {
        let closed = std::mem::take(&mut *self.lock()).len();
        if closed > 0 {
            tracing::info!(closed, "Reload subscribers closed");
        }
        closed
    }

    /// Number of live pending subscriptions.
    pub fn pending(&self) -> usize {
        self.lock().iter().filter(|s| !s.tx.is_closed()).count()
    }
}

impl Default for ReloadChannel {
    fn default() -> Self {
        Self::new(DeliveryPolicy::default())
    }
}
