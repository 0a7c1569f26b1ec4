//! Fire-and-forget fan-out to connected subscribers.
//!
//! Backed by a `tokio::sync::broadcast` channel. Publishing never waits on
//! subscribers and never fails: with nobody listening the event is dropped.
//! A subscriber that falls more than `capacity` events behind loses the
//! oldest ones and sees a `Lagged` error on its next receive.

use super::types::{EventTopic, RealtimeEvent};
use tokio::sync::broadcast;
use tracing::{debug, trace};

/// Default number of events buffered per subscriber.
pub const DEFAULT_EVENT_CAPACITY: usize = 64;

/// Publishes [`RealtimeEvent`]s to every current subscriber.
#[derive(Clone)]
pub struct EventBroadcaster {
    sender: broadcast::Sender<RealtimeEvent>,
}

impl EventBroadcaster {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publishes an event, returning how many subscribers it reached.
    pub fn publish(&self, event: RealtimeEvent) -> usize {
        let topic = event.topic();
        // Err only means there are no receivers
        match self.sender.send(event) {
            Ok(receivers) => {
                debug!(topic = %topic, receivers = receivers, "Event published");
                receivers
            }
            Err(_) => {
                trace!(topic = %topic, "Event dropped, no subscribers");
                0
            }
        }
    }

    /// Subscribes to every topic.
    pub fn subscribe(&self) -> broadcast::Receiver<RealtimeEvent> {
        self.sender.subscribe()
    }

    /// Subscribes to a single topic.
    pub fn subscribe_topic(&self, topic: EventTopic) -> TopicSubscription {
        TopicSubscription {
            topic,
            receiver: self.sender.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBroadcaster {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

/// Receiver that yields only events of one topic, in publish order.
pub struct TopicSubscription {
    topic: EventTopic,
    receiver: broadcast::Receiver<RealtimeEvent>,
}

impl TopicSubscription {
    pub fn topic(&self) -> EventTopic {
        self.topic
    }

    /// Waits for the next event on this topic.
    ///
    /// Returns `None` once the broadcaster is gone. Lagged gaps are skipped.
    pub async fn recv(&mut self) -> Option<RealtimeEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) if event.topic() == self.topic => return Some(event),
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!(topic = %self.topic, skipped = skipped, "Subscriber lagged");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}
