use std::time::Duration;

use tokio::sync::mpsc;

/// One inbound event from the session bus.
#[derive(Debug)]
pub struct BusEvent {
    pub topic: String,
    pub payload: Vec<u8>,
}

/// Result of one bounded poll of the subscription feed.
#[derive(Debug)]
pub enum BusPoll {
    Event(BusEvent),
    /// Nothing arrived within the timeout.
    Idle,
    /// All publisher handles are gone; the feed is finished.
    Closed,
}

/// Subscriber end of the session bus.
///
/// The transport that fills the channel is not the engine's concern; any
/// host wiring that owns the `Sender` side can feed it.
pub struct BusSubscriber {
    receiver: mpsc::Receiver<BusEvent>,
}

impl BusSubscriber {
    pub fn new(receiver: mpsc::Receiver<BusEvent>) -> Self {
        Self { receiver }
    }

    /// Creates a bus channel, returning the publisher handle and the
    /// subscriber.
    pub fn channel(buffer: usize) -> (mpsc::Sender<BusEvent>, Self) {
        let (sender, receiver) = mpsc::channel(buffer);
        (sender, Self::new(receiver))
    }

    /// Waits up to `timeout` for the next event.
    pub async fn poll(&mut self, timeout: Duration) -> BusPoll {
        match tokio::time::timeout(timeout, self.receiver.recv()).await {
            Err(_) => BusPoll::Idle,
            Ok(None) => BusPoll::Closed,
            Ok(Some(event)) => BusPoll::Event(event),
        }
    }
}
