//! The live platform side of the moderation workflow: renders notification
//! payloads to Discord markdown and applies sanctions over the HTTP client.

use std::sync::Arc;

use async_trait::async_trait;
use poise::serenity_prelude::{
    self as serenity, CreateMessage, EditMember, GuildId, Timestamp, UserId,
};

use crate::moderation::{Block, GatewayError, ModerationGateway, NotificationPayload};

pub struct SerenityGateway {
    pub http: Arc<serenity::Http>,
    pub guild_id: GuildId,
}

/// Renders the composer's display blocks as one markdown message.
pub fn render_notification(payload: &NotificationPayload) -> String {
    let mut parts = Vec::with_capacity(payload.blocks.len());

    for block in &payload.blocks {
        match block {
            Block::Heading(text) => parts.push(format!("## {text}")),
            Block::Quote(text) => parts.push(quoted(text)),
            Block::Excerpt {
                author_display_name,
                body,
                permalink,
                created_at_epoch_secs,
            } => {
                let timestamp = match permalink {
                    Some(url) => {
                        format!("-# 🔗 [Jump to message]({url}) | <t:{created_at_epoch_secs}>")
                    }
                    None => format!("-# <t:{created_at_epoch_secs}>"),
                };
                parts.push(format!(
                    "### Your offending message:\n> **{author_display_name}**\n{}\n{timestamp}",
                    quoted(body)
                ));
            }
            Block::Expiry {
                expires_at_epoch_secs,
            } => parts.push(format!(
                "-# Your timeout will expire <t:{expires_at_epoch_secs}:R>. Please review the \
                 rules if necessary, and if you feel the timeout was undeserved, message a \
                 moderator."
            )),
            Block::Footer(text) => parts.push(format!("-# {text}")),
        }
    }

    parts.join("\n\n")
}

fn quoted(text: &str) -> String {
    text.lines()
        .map(|line| format!("> {line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[async_trait]
impl ModerationGateway for SerenityGateway {
    async fn send_direct_message(
        &self,
        user_id: u64,
        payload: &NotificationPayload,
    ) -> Result<(), GatewayError> {
        let undeliverable = |e: serenity::Error| GatewayError::Undeliverable(e.to_string());

        let channel = UserId::new(user_id)
            .create_dm_channel(&self.http)
            .await
            .map_err(undeliverable)?;

        channel
            .send_message(
                &self.http,
                CreateMessage::new().content(render_notification(payload)),
            )
            .await
            .map_err(undeliverable)?;

        Ok(())
    }

    async fn ban(
        &self,
        user_id: u64,
        delete_message_seconds: u32,
        audit_reason: &str,
    ) -> Result<(), GatewayError> {
        // The REST ban endpoint takes whole days; round up so a one-hour
        // window still covers the last hour.
        let delete_message_days =
            u8::try_from(u64::from(delete_message_seconds).div_ceil(86_400)).unwrap_or(7);

        self.guild_id
            .ban_with_reason(
                &self.http,
                UserId::new(user_id),
                delete_message_days,
                audit_reason,
            )
            .await
            .map_err(map_platform_error)
    }

    async fn timeout(
        &self,
        user_id: u64,
        until_epoch_ms: i64,
        audit_reason: &str,
    ) -> Result<(), GatewayError> {
        let until = Timestamp::from_unix_timestamp(until_epoch_ms / 1_000)
            .map_err(|e| GatewayError::Rejected(e.to_string()))?;

        self.guild_id
            .edit_member(
                &self.http,
                UserId::new(user_id),
                EditMember::new()
                    .disable_communication_until_datetime(until)
                    .audit_log_reason(audit_reason),
            )
            .await
            .map(drop)
            .map_err(map_platform_error)
    }
}

fn map_platform_error(e: serenity::Error) -> GatewayError {
    if let serenity::Error::Http(serenity::HttpError::UnsuccessfulRequest(ref response)) = e {
        if response.status_code.as_u16() == 404 {
            return GatewayError::NotFound;
        }
    }

    GatewayError::Rejected(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::render_notification;
    use crate::moderation::{Block, NotificationPayload};

    #[test]
    fn renders_blocks_in_order() {
        let payload = NotificationPayload {
            blocks: vec![
                Block::Heading("You've been banned from **Kristal**.".to_owned()),
                Block::Quote("line one\nline two".to_owned()),
                Block::Footer("message a moderator.".to_owned()),
            ],
        };

        let rendered = render_notification(&payload);

        assert_eq!(
            rendered,
            "## You've been banned from **Kristal**.\n\n> line one\n> line two\n\n-# message a moderator."
        );
    }

    #[test]
    fn excerpt_renders_jump_link_only_when_present() {
        let with_link = NotificationPayload {
            blocks: vec![Block::Excerpt {
                author_display_name: "Susie".to_owned(),
                body: "hi".to_owned(),
                permalink: Some("https://example.com/m/1".to_owned()),
                created_at_epoch_secs: 1_700_000_000,
            }],
        };
        let without_link = NotificationPayload {
            blocks: vec![Block::Excerpt {
                author_display_name: "Susie".to_owned(),
                body: "hi".to_owned(),
                permalink: None,
                created_at_epoch_secs: 1_700_000_000,
            }],
        };

        assert!(render_notification(&with_link)
            .contains("[Jump to message](https://example.com/m/1) | <t:1700000000>"));
        assert!(render_notification(&without_link).contains("-# <t:1700000000>"));
        assert!(!render_notification(&without_link).contains("Jump to message"));
    }

    #[test]
    fn expiry_renders_as_relative_timestamp() {
        let payload = NotificationPayload {
            blocks: vec![Block::Expiry {
                expires_at_epoch_secs: 2_800,
            }],
        };

        assert!(render_notification(&payload).contains("<t:2800:R>"));
    }
}
