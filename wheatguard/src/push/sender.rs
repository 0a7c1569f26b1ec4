//! Push delivery backends.
//!
//! # FCM
//!
//! [`FcmSender`] posts to the Firebase Cloud Messaging legacy HTTP endpoint
//! with `Authorization: key=<server key>` and a body of the form
//!
//! ```json
//! {"to": "<token>", "notification": {"title": "...", "body": "...", "sound": "default"}, "data": {...}}
//! ```

use super::types::{PushError, PushNotification};
use crate::provider::{with_timeout, AsyncHttpClient};
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// FCM legacy send endpoint.
pub const FCM_SEND_URL: &str = "https://fcm.googleapis.com/fcm/send";

/// Async trait for delivering one push notification.
pub trait PushSender: Send + Sync {
    fn send(
        &self,
        notification: &PushNotification,
    ) -> impl Future<Output = Result<(), PushError>> + Send;
}

/// Firebase Cloud Messaging sender.
pub struct FcmSender<C: AsyncHttpClient> {
    http_client: C,
    server_key: String,
    url: String,
    timeout: Duration,
}

impl<C: AsyncHttpClient> FcmSender<C> {
    pub fn new(http_client: C, server_key: impl Into<String>, timeout: Duration) -> Self {
        Self {
            http_client,
            server_key: server_key.into(),
            url: FCM_SEND_URL.to_string(),
            timeout,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    fn payload(notification: &PushNotification) -> Result<String, PushError> {
        let body = serde_json::json!({
            "to": notification.token,
            "notification": {
                "title": notification.title,
                "body": notification.body,
                "sound": "default",
            },
            "data": notification.data,
        });
        serde_json::to_string(&body).map_err(|e| PushError::Encoding(e.to_string()))
    }
}

impl<C: AsyncHttpClient> PushSender for FcmSender<C> {
    async fn send(&self, notification: &PushNotification) -> Result<(), PushError> {
        if self.server_key.is_empty() {
            return Err(PushError::MissingServerKey);
        }

        let body = Self::payload(notification)?;
        let auth = format!("key={}", self.server_key);
        let headers = [("Authorization", auth.as_str())];

        with_timeout(
            self.timeout,
            "push send",
            self.http_client.post_json(&self.url, &body, &headers),
        )
        .await
        .map_err(|e| PushError::Delivery(e.to_string()))?;

        debug!(title = %notification.title, "Push notification sent");
        Ok(())
    }
}
