//! Composes the notice shown to a sanctioned user.
//!
//! The output is an ordered sequence of display blocks; turning those into
//! platform markdown is the adapter's job (see `crate::discord`), so these
//! functions stay pure and directly assertable.

/// Shown in place of the message body when the offending message had no
/// text content (attachment-only messages, for example).
pub const NO_TEXT_PLACEHOLDER: &str = "*[No text content]*";

/// The message that triggered the action, quoted back to its author.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageExcerpt {
    pub author_display_name: String,
    pub body: String,
    pub created_at_epoch_secs: i64,
    pub permalink: String,
}

/// One display block of a sanction notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading(String),
    /// The moderator-supplied reason, rendered visually distinct.
    Quote(String),
    /// The offending message. `permalink` is populated for timeouts but not
    /// bans; a banned user cannot follow a jump link into the guild.
    Excerpt {
        author_display_name: String,
        body: String,
        permalink: Option<String>,
        created_at_epoch_secs: i64,
    },
    /// Relative expiry line for timeouts.
    Expiry { expires_at_epoch_secs: i64 },
    Footer(String),
}

/// Ordered display blocks making up one direct message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationPayload {
    pub blocks: Vec<Block>,
}

/// Builds the DM for a timeout.
pub fn timeout_notice(
    guild_name: &str,
    reason: Option<&str>,
    excerpt: Option<&MessageExcerpt>,
    now_epoch_ms: i64,
    duration_ms: u64,
) -> NotificationPayload {
    let mut blocks = headline("⏰ You've been timed out from", guild_name, reason);

    if let Some(excerpt) = excerpt {
        blocks.push(excerpt_block(excerpt, true));
    }

    blocks.push(Block::Expiry {
        expires_at_epoch_secs: (now_epoch_ms + duration_ms as i64) / 1_000,
    });

    NotificationPayload { blocks }
}

/// Builds the DM for a ban.
pub fn ban_notice(
    guild_name: &str,
    reason: Option<&str>,
    excerpt: Option<&MessageExcerpt>,
) -> NotificationPayload {
    let mut blocks = headline("🔨 You've been banned from", guild_name, reason);

    if let Some(excerpt) = excerpt {
        blocks.push(excerpt_block(excerpt, false));
    }

    blocks.push(Block::Footer(
        "If you feel the ban was undeserved, message a moderator.".to_owned(),
    ));

    NotificationPayload { blocks }
}

fn headline(action: &str, guild_name: &str, reason: Option<&str>) -> Vec<Block> {
    match reason {
        Some(reason) => vec![
            Block::Heading(format!(
                "{action} **{guild_name}** for the following reason:"
            )),
            Block::Quote(reason.to_owned()),
        ],
        None => vec![Block::Heading(format!("{action} **{guild_name}**."))],
    }
}

fn excerpt_block(excerpt: &MessageExcerpt, with_permalink: bool) -> Block {
    let body = if excerpt.body.trim().is_empty() {
        NO_TEXT_PLACEHOLDER.to_owned()
    } else {
        excerpt.body.clone()
    };

    Block::Excerpt {
        author_display_name: excerpt.author_display_name.clone(),
        body,
        permalink: with_permalink.then(|| excerpt.permalink.clone()),
        created_at_epoch_secs: excerpt.created_at_epoch_secs,
    }
}
