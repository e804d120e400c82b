//! Notification handlers.
//!
//! ## Commands
//! - Sending one notification or a batch
//! - Resending a recorded notification
//!
//! Every attempt, successful or not, leaves exactly one history record.

mod delivery;
mod resend_notification;
mod send_notification;

pub use delivery::{DeliveryTimeouts, NotificationDelivery};
pub use resend_notification::{ResendNotificationCommand, ResendNotificationHandler};
pub use send_notification::{
    BatchResult, SendBatchCommand, SendNotificationCommand, SendNotificationHandler,
};
