// --- File: crates/slotbook_booking/src/feed.rs ---
//! In-process change feed.
//!
//! Every successful insert or clear is published here. Subscribers that fall
//! behind the channel capacity get a single [`BookingChange::Resync`] instead of
//! the events they missed.

use futures::stream;
use slotbook_common::models::BookingChange;
use slotbook_common::services::ChangeStream;
use tokio::sync::broadcast;
use tracing::{debug, warn};

pub const DEFAULT_FEED_CAPACITY: usize = 256;

/// Broadcast hub for booking changes.
#[derive(Clone)]
pub struct ChangeFeed {
    sender: broadcast::Sender<BookingChange>,
}

impl ChangeFeed {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Send a change to every current subscriber. No-op if nobody is listening.
    pub fn publish(&self, change: BookingChange) {
        match self.sender.send(change) {
            Ok(receivers) => debug!(receivers, "Published booking change"),
            Err(_) => debug!("Booking change published with no subscribers"),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BookingChange> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// A fresh subscription as a stream.
    pub fn stream(&self) -> ChangeStream {
        change_stream(self.subscribe())
    }
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new(DEFAULT_FEED_CAPACITY)
    }
}

/// Turns a receiver into a stream that ends when the feed is dropped.
pub fn change_stream(receiver: broadcast::Receiver<BookingChange>) -> ChangeStream {
    Box::pin(stream::unfold(receiver, |mut receiver| async move {
        match receiver.recv().await {
            Ok(change) => Some((change, receiver)),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(skipped, "Change subscriber lagged behind, asking it to resync");
                Some((BookingChange::Resync, receiver))
            }
            Err(broadcast::error::RecvError::Closed) => None,
        }
    }))
}
