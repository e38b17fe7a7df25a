//! Gateway event fan-out.
//!
//! Every subscriber owns an unbounded queue. Publishing enqueues the event
//! for each live subscriber in registration order and never blocks, so the
//! supervisor can publish while holding its state lock. Dropping a
//! `Subscription` cancels delivery.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use openclaw_core::GatewayEvent;
use tokio::sync::mpsc;
use tracing::debug;

type Subscribers = Vec<(u64, mpsc::UnboundedSender<GatewayEvent>)>;

#[derive(Debug, Default)]
struct BusShared {
    subscribers: Mutex<Subscribers>,
    next_id: AtomicU64,
}

impl BusShared {
    fn lock(&self) -> MutexGuard<'_, Subscribers> {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn remove(&self, id: u64) {
        self.lock().retain(|(sub_id, _)| *sub_id != id);
    }
}

/// Broadcaster for status-changed and new-log events.
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    shared: Arc<BusShared>,
}

impl EventBus {
    /// Create a new bus with no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber. It only sees events published from now on.
    pub fn subscribe(&self) -> Subscription {
        let id = self.shared.next_id.fetch_add(1, Ordering::Relaxed);
        let (sender, receiver) = mpsc::unbounded_channel();
        self.shared.lock().push((id, sender));

        Subscription {
            id,
            receiver,
            bus: Arc::downgrade(&self.shared),
        }
    }

    /// Deliver an event to every subscriber, in registration order.
    pub fn publish(&self, event: GatewayEvent) {
        let mut subscribers = self.shared.lock();
        if subscribers.is_empty() {
            return;
        }

        debug!(
            channel = event.channel(),
            subscribers = subscribers.len(),
            "Publishing gateway event"
        );
        // A failed send means the receiver is gone; drop the subscriber.
        subscribers.retain(|(_, sender)| sender.send(event.clone()).is_ok());
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.shared.lock().len()
    }
}

/// Handle to a subscriber's event queue.
///
/// Dropping it (or calling [`Subscription::unsubscribe`]) stops delivery.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    receiver: mpsc::UnboundedReceiver<GatewayEvent>,
    bus: Weak<BusShared>,
}

impl Subscription {
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Wait for the next event. Returns `None` once the bus is gone.
    pub async fn recv(&mut self) -> Option<GatewayEvent> {
        self.receiver.recv().await
    }

    /// Take the next queued event without waiting.
    pub fn try_recv(&mut self) -> Option<GatewayEvent> {
        self.receiver.try_recv().ok()
    }

    /// Cancel delivery to this subscriber.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(bus) = self.bus.upgrade() {
            bus.remove(self.id);
        }
    }
}
