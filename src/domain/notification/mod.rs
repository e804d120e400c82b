//! Notification domain - templates, typed inputs and send history.

mod history;
mod template;

pub use history::{DeliveryStatus, NotificationHistoryRecord, Recipient, RecipientType};
pub use template::{
    ContactParams, KnownParams, PaymentFailedParams, RenderedTemplate, RenewalReminderParams,
    TemplateParams, TemplateType, WelcomeParams,
};
