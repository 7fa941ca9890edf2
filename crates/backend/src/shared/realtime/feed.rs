use contracts::domain::common::AggregateRoot;
use contracts::shared::realtime::{ChangeEvent, ChangeKind};
use once_cell::sync::OnceCell;
use tokio::sync::broadcast;

/// Default capacity when the feed is used before [`init_feed`].
const DEFAULT_CAPACITY: usize = 256;

static FEED: OnceCell<ChangeFeed> = OnceCell::new();

/// Broadcasts change events to all connected subscribers.
///
/// Slow subscribers that fall more than `capacity` events behind skip the
/// missed events and continue with the newest ones.
#[derive(Clone)]
pub struct ChangeFeed {
    sender: broadcast::Sender<ChangeEvent>,
}

impl ChangeFeed {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publish an event. Returns the number of subscribers that received it.
    pub fn publish(&self, event: ChangeEvent) -> usize {
        // Err only means nobody is listening right now
        self.sender.send(event).unwrap_or(0)
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.sender.subscribe()
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// Install the process-wide feed with the configured capacity.
pub fn init_feed(capacity: usize) {
    if FEED.set(ChangeFeed::new(capacity)).is_err() {
        tracing::warn!("Realtime feed already initialized, capacity {} ignored", capacity);
    }
}

/// Process-wide feed used by services and the WebSocket endpoint.
pub fn feed() -> &'static ChangeFeed {
    FEED.get_or_init(|| ChangeFeed::new(DEFAULT_CAPACITY))
}

/// Publish a change of an aggregate row on its table channel.
pub fn notify<A: AggregateRoot>(kind: ChangeKind, record_id: impl ToString) {
    let event = ChangeEvent::new(A::realtime_channel(), kind, record_id.to_string());
    let delivered = feed().publish(event);
    tracing::debug!(
        "Realtime {:?} on {} delivered to {} subscriber(s)",
        kind,
        A::realtime_channel(),
        delivered
    );
}
