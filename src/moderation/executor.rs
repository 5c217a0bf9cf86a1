//! Sequences a moderation action: validate, notify, act, report.
//!
//! Each step runs at most once; any failure is terminal for the invocation
//! and the moderator has to re-invoke. The one deliberate exception is the
//! courtesy DM: an undeliverable notice is logged and reported but never
//! blocks the action itself.

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, warn};

use super::notify::{self, MessageExcerpt, NotificationPayload};
use super::{policy, ModerationError};

/// The punitive action to take, carrying the raw input exactly as the entry
/// point collected it. Validation happens here, not at the entry points.
#[derive(Debug, Clone)]
pub enum Sanction {
    Timeout { duration_raw: String },
    Ban { history_window_hours: Option<u32> },
}

/// One moderation action, built fresh per invocation and never persisted.
#[derive(Debug, Clone)]
pub struct ModerationRequest {
    pub target_user_id: u64,
    pub target_display_name: String,
    pub executor_display_name: String,
    pub guild_name: String,
    pub reason: Option<String>,
    pub sanction: Sanction,
    pub triggering_message: Option<MessageExcerpt>,
}

/// How the platform can fail us.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("target not found")]
    NotFound,
    #[error("rejected by the platform: {0}")]
    Rejected(String),
    #[error("could not deliver: {0}")]
    Undeliverable(String),
}

/// The narrow slice of the chat platform the executor needs. The live
/// implementation wraps the Discord HTTP client; tests use a recording
/// double.
#[async_trait]
pub trait ModerationGateway: Send + Sync {
    async fn send_direct_message(
        &self,
        user_id: u64,
        payload: &NotificationPayload,
    ) -> Result<(), GatewayError>;

    async fn ban(
        &self,
        user_id: u64,
        delete_message_seconds: u32,
        audit_reason: &str,
    ) -> Result<(), GatewayError>;

    async fn timeout(
        &self,
        user_id: u64,
        until_epoch_ms: i64,
        audit_reason: &str,
    ) -> Result<(), GatewayError>;
}

/// What happened, for the operator-facing confirmation.
#[derive(Debug)]
pub struct ActionReport {
    pub target_display_name: String,
    pub target_user_id: u64,
    pub reason: Option<String>,
    /// The duration exactly as the moderator typed it; `None` for bans.
    pub duration_raw: Option<String>,
    /// Whether the courtesy DM reached the user.
    pub notified: bool,
}

impl ActionReport {
    /// Success summary used to edit the deferred ephemeral reply.
    pub fn operator_summary(&self) -> String {
        let mut summary = match &self.duration_raw {
            Some(duration) => format!(
                "✅ Timed out {} (`{}`) for {}.",
                self.target_display_name, self.target_user_id, duration
            ),
            None => format!(
                "✅ Banned {} (`{}`).",
                self.target_display_name, self.target_user_id
            ),
        };

        if let Some(reason) = &self.reason {
            summary.push_str(&format!(" Reason: {reason}"));
        }

        if !self.notified {
            summary.push_str("\n⚠️ The user could not be notified (DMs disabled?).");
        }

        summary
    }
}

enum Validated {
    Timeout { duration_ms: u64 },
    Ban { delete_message_seconds: u32 },
}

/// Runs the full workflow for one request.
///
/// `now_epoch_ms` is taken as a parameter so expiry math is deterministic
/// under test.
pub async fn execute(
    gateway: &dyn ModerationGateway,
    request: ModerationRequest,
    now_epoch_ms: i64,
) -> Result<ActionReport, ModerationError> {
    let validated = match &request.sanction {
        Sanction::Timeout { duration_raw } => Validated::Timeout {
            duration_ms: policy::validate_timeout_duration(duration_raw)?,
        },
        Sanction::Ban {
            history_window_hours,
        } => Validated::Ban {
            delete_message_seconds: policy::validate_history_window(*history_window_hours)?,
        },
    };

    let payload = match &validated {
        Validated::Timeout { duration_ms } => notify::timeout_notice(
            &request.guild_name,
            request.reason.as_deref(),
            request.triggering_message.as_ref(),
            now_epoch_ms,
            *duration_ms,
        ),
        Validated::Ban { .. } => notify::ban_notice(
            &request.guild_name,
            request.reason.as_deref(),
            request.triggering_message.as_ref(),
        ),
    };

    // Notification is a courtesy, not a precondition for the action.
    let notified = match gateway
        .send_direct_message(request.target_user_id, &payload)
        .await
    {
        Ok(()) => true,
        Err(e) => {
            warn!(
                target_user_id = request.target_user_id,
                "sanction notice undelivered: {e}"
            );
            false
        }
    };

    let audit_reason = format!(
        "{}: {}",
        request.executor_display_name,
        request.reason.as_deref().unwrap_or("No reason provided.")
    );

    let acted = match &validated {
        Validated::Timeout { duration_ms } => {
            gateway
                .timeout(
                    request.target_user_id,
                    now_epoch_ms + *duration_ms as i64,
                    &audit_reason,
                )
                .await
        }
        Validated::Ban {
            delete_message_seconds,
        } => {
            gateway
                .ban(request.target_user_id, *delete_message_seconds, &audit_reason)
                .await
        }
    };

    match acted {
        Ok(()) => debug!(target_user_id = request.target_user_id, "action applied"),
        Err(GatewayError::NotFound) => return Err(ModerationError::TargetNotFound),
        Err(e) => return Err(ModerationError::PlatformRejected(e.to_string())),
    }

    let duration_raw = match request.sanction {
        Sanction::Timeout { duration_raw } => Some(duration_raw),
        Sanction::Ban { .. } => None,
    };

    Ok(ActionReport {
        target_display_name: request.target_display_name,
        target_user_id: request.target_user_id,
        reason: request.reason,
        duration_raw,
        notified,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Debug, PartialEq, Eq)]
    enum Call {
        Dm(u64),
        Ban {
            user_id: u64,
            delete_message_seconds: u32,
            reason: String,
        },
        Timeout {
            user_id: u64,
            until_epoch_ms: i64,
            reason: String,
        },
    }

    #[derive(Default)]
    struct RecordingGateway {
        calls: Mutex<Vec<Call>>,
        fail_dm: bool,
        target_gone: bool,
        reject_action: bool,
    }

    #[async_trait]
    impl ModerationGateway for RecordingGateway {
        async fn send_direct_message(
            &self,
            user_id: u64,
            _payload: &NotificationPayload,
        ) -> Result<(), GatewayError> {
            self.calls.lock().unwrap().push(Call::Dm(user_id));
            if self.fail_dm {
                return Err(GatewayError::Undeliverable("dms closed".into()));
            }
            Ok(())
        }

        async fn ban(
            &self,
            user_id: u64,
            delete_message_seconds: u32,
            audit_reason: &str,
        ) -> Result<(), GatewayError> {
            self.calls.lock().unwrap().push(Call::Ban {
                user_id,
                delete_message_seconds,
                reason: audit_reason.to_owned(),
            });
            self.action_result()
        }

        async fn timeout(
            &self,
            user_id: u64,
            until_epoch_ms: i64,
            audit_reason: &str,
        ) -> Result<(), GatewayError> {
            self.calls.lock().unwrap().push(Call::Timeout {
                user_id,
                until_epoch_ms,
                reason: audit_reason.to_owned(),
            });
            self.action_result()
        }
    }

    impl RecordingGateway {
        fn action_result(&self) -> Result<(), GatewayError> {
            if self.target_gone {
                return Err(GatewayError::NotFound);
            }
            if self.reject_action {
                return Err(GatewayError::Rejected("missing permissions".into()));
            }
            Ok(())
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().drain(..).collect()
        }
    }

    fn timeout_request(duration_raw: &str, reason: Option<&str>) -> ModerationRequest {
        ModerationRequest {
            target_user_id: 42,
            target_display_name: "Susie".to_owned(),
            executor_display_name: "Moddy".to_owned(),
            guild_name: "Kristal".to_owned(),
            reason: reason.map(str::to_owned),
            sanction: Sanction::Timeout {
                duration_raw: duration_raw.to_owned(),
            },
            triggering_message: None,
        }
    }

    fn ban_request(hours: Option<u32>, reason: Option<&str>) -> ModerationRequest {
        ModerationRequest {
            target_user_id: 42,
            target_display_name: "Susie".to_owned(),
            executor_display_name: "Moddy".to_owned(),
            guild_name: "Kristal".to_owned(),
            reason: reason.map(str::to_owned),
            sanction: Sanction::Ban {
                history_window_hours: hours,
            },
            triggering_message: None,
        }
    }

    #[tokio::test]
    async fn timeout_notifies_then_acts_and_reports_the_literal_duration() {
        let gateway = RecordingGateway::default();

        let report = execute(&gateway, timeout_request("30m", None), 1_000_000)
            .await
            .unwrap();

        assert_eq!(
            gateway.calls(),
            vec![
                Call::Dm(42),
                Call::Timeout {
                    user_id: 42,
                    until_epoch_ms: 1_000_000 + 1_800_000,
                    reason: "Moddy: No reason provided.".to_owned(),
                },
            ]
        );
        let summary = report.operator_summary();
        assert!(summary.contains("✅ Timed out Susie (`42`) for 30m."));
        assert!(report.notified);
    }

    #[tokio::test]
    async fn invalid_duration_touches_nothing() {
        let gateway = RecordingGateway::default();

        let result = execute(&gateway, timeout_request("soon", None), 0).await;

        assert!(matches!(result, Err(ModerationError::InvalidDuration)));
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn out_of_bounds_duration_touches_nothing() {
        let gateway = RecordingGateway::default();

        let result = execute(&gateway, timeout_request("29d", None), 0).await;

        assert!(matches!(result, Err(ModerationError::DurationOutOfBounds)));
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn ban_converts_the_history_window_to_seconds() {
        let gateway = RecordingGateway::default();

        let report = execute(&gateway, ban_request(Some(6), Some("spam")), 0)
            .await
            .unwrap();

        assert_eq!(
            gateway.calls(),
            vec![
                Call::Dm(42),
                Call::Ban {
                    user_id: 42,
                    delete_message_seconds: 21_600,
                    reason: "Moddy: spam".to_owned(),
                },
            ]
        );
        assert!(report.operator_summary().contains("Reason: spam"));
    }

    #[tokio::test]
    async fn unlisted_history_window_touches_nothing() {
        let gateway = RecordingGateway::default();

        let result = execute(&gateway, ban_request(Some(5), None), 0).await;

        assert!(matches!(result, Err(ModerationError::InvalidHistoryWindow)));
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn absent_history_window_touches_nothing() {
        let gateway = RecordingGateway::default();

        let result = execute(&gateway, ban_request(None, None), 0).await;

        assert!(matches!(result, Err(ModerationError::InvalidHistoryWindow)));
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn undeliverable_dm_does_not_block_the_ban() {
        let gateway = RecordingGateway {
            fail_dm: true,
            ..Default::default()
        };

        let report = execute(&gateway, ban_request(Some(0), None), 0)
            .await
            .unwrap();

        assert!(!report.notified);
        assert!(report
            .operator_summary()
            .contains("could not be notified"));
        let calls = gateway.calls();
        assert!(matches!(calls[1], Call::Ban { .. }));
    }

    #[tokio::test]
    async fn vanished_target_maps_to_target_not_found() {
        let gateway = RecordingGateway {
            target_gone: true,
            ..Default::default()
        };

        let result = execute(&gateway, ban_request(Some(0), None), 0).await;

        assert!(matches!(result, Err(ModerationError::TargetNotFound)));
    }

    #[tokio::test]
    async fn platform_rejection_is_terminal() {
        let gateway = RecordingGateway {
            reject_action: true,
            ..Default::default()
        };

        let result = execute(&gateway, timeout_request("10m", None), 0).await;

        assert!(matches!(result, Err(ModerationError::PlatformRejected(_))));
    }
}
