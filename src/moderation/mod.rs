//! The moderation workflow: duration parsing, bound checks, notice
//! composition and the executor that sequences them against the platform.
//!
//! Nothing in this module talks to Discord directly; the executor reaches
//! the platform through the [`ModerationGateway`] trait so the whole
//! workflow runs in tests without a live connection.

pub mod duration;
pub mod executor;
pub mod notify;
pub mod policy;

pub use executor::{
    execute, ActionReport, GatewayError, ModerationGateway, ModerationRequest, Sanction,
};
pub use notify::{Block, MessageExcerpt, NotificationPayload};

use thiserror::Error;

/// Everything that can stop a moderation action, in the order the steps run.
///
/// The `Display` text of the input-validation variants is exactly what the
/// invoking moderator sees in the ephemeral reply.
#[derive(Debug, Error)]
pub enum ModerationError {
    #[error("❌ Invalid duration! Examples: `30m`, `2.5h`, `4d12h`")]
    InvalidDuration,
    #[error("❌ Duration must be between 30 seconds and 28 days!")]
    DurationOutOfBounds,
    #[error("❌ Invalid delete duration! Must be between 0 and 168 hours (7 days).")]
    InvalidHistoryWindow,
    #[error("❌ User not found!")]
    TargetNotFound,
    #[error("❌ Could not apply the action: {0}")]
    PlatformRejected(String),
}
