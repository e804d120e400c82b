//! Mail transport adapters.
//!
//! - `ResendMailTransport` - Resend HTTP API over reqwest
//! - `RecordingMailTransport` - keeps sent mail in memory, for tests and local runs

mod recording;
mod resend;

pub use recording::RecordingMailTransport;
pub use resend::ResendMailTransport;
