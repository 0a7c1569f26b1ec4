//! Push notification types.

use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

/// One individually addressed push notification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PushNotification {
    /// Device push token
    pub token: String,
    pub title: String,
    pub body: String,
    /// Custom key-value payload delivered alongside the notification
    pub data: BTreeMap<String, String>,
}

/// Failure delivering a single notification.
#[derive(Debug, Clone, Error)]
pub enum PushError {
    #[error("push server key is not configured")]
    MissingServerKey,

    #[error("push delivery failed: {0}")]
    Delivery(String),

    #[error("push payload could not be encoded: {0}")]
    Encoding(String),
}

/// Outcome of one proximity dispatch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    /// Registered devices examined
    pub considered: usize,
    /// Devices with a location inside the radius
    pub in_range: usize,
    /// Notifications accepted by the push service
    pub delivered: usize,
    /// Notifications that failed to send
    pub failed: usize,
}
