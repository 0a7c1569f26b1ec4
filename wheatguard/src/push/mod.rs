//! Proximity push notifications
//!
//! [`PushDispatcher`] selects registered devices near an outbreak and
//! delivers one notification each through a [`PushSender`] such as
//! [`FcmSender`].

mod dispatcher;
mod sender;
mod types;

pub use dispatcher::{
    outbreak_notification, PushDispatcher, DEFAULT_PUSH_CONCURRENCY, DEFAULT_PUSH_RADIUS_KM,
};
pub use sender::{FcmSender, PushSender, FCM_SEND_URL};
pub use types::{DispatchReport, PushError, PushNotification};
