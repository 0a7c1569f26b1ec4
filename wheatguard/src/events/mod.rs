//! Real-time event fan-out
//!
//! Domain events (`new_detection`, `new_alert`, `ndvi_stress_update`) are a
//! closed [`RealtimeEvent`] enum delivered through an [`EventBroadcaster`].

mod broadcaster;
mod types;

pub use broadcaster::{EventBroadcaster, TopicSubscription, DEFAULT_EVENT_CAPACITY};
pub use types::{DetectionEvent, EventTopic, OutbreakEvent, RealtimeEvent};
