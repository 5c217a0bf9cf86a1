//! Entry points for the ban and timeout workflows.
//!
//! Three entry points per action (slash command, user context menu, message
//! context menu) differ only in how they collect the target, reason and
//! duration; they all hand a [`ModerationRequest`] to the shared executor.

use poise::serenity_prelude as serenity;
use poise::{ChoiceParameter, Modal};
use tracing::instrument;
use uuid::Uuid;

use crate::commands::say_ephemeral;
use crate::discord::SerenityGateway;
use crate::moderation::{self, MessageExcerpt, ModerationRequest, Sanction};
use crate::{ApplicationContext, Context, Error};

/// The enumerated history-deletion windows offered on `/ban`.
#[derive(Debug, Clone, Copy, ChoiceParameter)]
pub enum HistoryWindow {
    #[name = "Don't Delete Any"]
    None,
    #[name = "Previous Hour"]
    Hour,
    #[name = "Previous 6 Hours"]
    SixHours,
    #[name = "Previous 12 Hours"]
    TwelveHours,
    #[name = "Previous 24 Hours"]
    Day,
    #[name = "Previous 3 Days"]
    ThreeDays,
    #[name = "Previous 7 Days"]
    Week,
}

impl HistoryWindow {
    pub fn hours(self) -> u32 {
        match self {
            Self::None => 0,
            Self::Hour => 1,
            Self::SixHours => 6,
            Self::TwelveHours => 12,
            Self::Day => 24,
            Self::ThreeDays => 72,
            Self::Week => 168,
        }
    }
}

#[derive(Debug, Modal)]
#[name = "Timeout User"]
struct TimeoutModal {
    #[name = "Duration of the timeout"]
    #[placeholder = "e.g., 30m, 2.5h, 4d12h"]
    duration: String,
    #[name = "Reason for the timeout (optional)"]
    #[placeholder = "Reason for the timeout"]
    #[paragraph]
    reason: Option<String>,
}

#[derive(Debug, Modal)]
#[name = "Ban User"]
struct BanModal {
    #[name = "Reason for the ban (optional)"]
    #[placeholder = "Breaking server rules"]
    #[paragraph]
    reason: Option<String>,
    #[name = "Delete message history (hours)"]
    #[placeholder = "One of: 0, 1, 6, 12, 24, 72, 168"]
    delete_messages: Option<String>,
}

impl BanModal {
    fn prefilled() -> Self {
        Self {
            reason: None,
            delete_messages: Some("0".to_owned()),
        }
    }
}

/// [MOD] Bans a member.
#[instrument(skip(ctx), fields(request_id = %Uuid::new_v4()))]
#[poise::command(
    slash_command,
    guild_only,
    default_member_permissions = "MODERATE_MEMBERS",
    category = "Moderation"
)]
pub async fn ban(
    ctx: Context<'_>,
    #[description = "The user to ban"] user: serenity::User,
    #[description = "How much of their recent message history to delete"]
    delete_messages: Option<HistoryWindow>,
    #[description = "The reason for banning, if any"] reason: Option<String>,
) -> Result<(), Error> {
    ctx.defer_ephemeral().await?;

    moderate(
        ctx,
        user.id,
        Sanction::Ban {
            history_window_hours: delete_messages.map(HistoryWindow::hours),
        },
        reason,
        None,
    )
    .await
}

/// [MOD] Times out a member.
#[instrument(skip(ctx), fields(request_id = %Uuid::new_v4()))]
#[poise::command(
    slash_command,
    guild_only,
    default_member_permissions = "MODERATE_MEMBERS",
    category = "Moderation"
)]
pub async fn timeout(
    ctx: Context<'_>,
    #[description = "The user to timeout"] user: serenity::User,
    #[description = "Duration of the timeout. Examples: `30m`, `2.5h`, `4d12h`"] duration: String,
    #[description = "The reason for the timeout"] reason: Option<String>,
) -> Result<(), Error> {
    ctx.defer_ephemeral().await?;

    moderate(
        ctx,
        user.id,
        Sanction::Timeout {
            duration_raw: duration,
        },
        reason,
        None,
    )
    .await
}

#[poise::command(
    context_menu_command = "Ban User",
    guild_only,
    default_member_permissions = "MODERATE_MEMBERS",
    category = "Moderation"
)]
pub async fn ban_user(ctx: ApplicationContext<'_>, user: serenity::User) -> Result<(), Error> {
    let Some(input) = BanModal::execute_with_defaults(ctx, BanModal::prefilled()).await? else {
        return Ok(());
    };

    moderate(
        poise::Context::Application(ctx),
        user.id,
        Sanction::Ban {
            history_window_hours: parse_history_hours(input.delete_messages),
        },
        input.reason,
        None,
    )
    .await
}

#[poise::command(
    context_menu_command = "Ban User (Message)",
    guild_only,
    default_member_permissions = "MODERATE_MEMBERS",
    category = "Moderation"
)]
pub async fn ban_message(
    ctx: ApplicationContext<'_>,
    message: serenity::Message,
) -> Result<(), Error> {
    let Some(input) = BanModal::execute_with_defaults(ctx, BanModal::prefilled()).await? else {
        return Ok(());
    };

    moderate(
        poise::Context::Application(ctx),
        message.author.id,
        Sanction::Ban {
            history_window_hours: parse_history_hours(input.delete_messages),
        },
        input.reason,
        Some(excerpt_of(&message)),
    )
    .await
}

#[poise::command(
    context_menu_command = "Timeout User",
    guild_only,
    default_member_permissions = "MODERATE_MEMBERS",
    category = "Moderation"
)]
pub async fn timeout_user(ctx: ApplicationContext<'_>, user: serenity::User) -> Result<(), Error> {
    let Some(input) = TimeoutModal::execute(ctx).await? else {
        return Ok(());
    };

    moderate(
        poise::Context::Application(ctx),
        user.id,
        Sanction::Timeout {
            duration_raw: input.duration,
        },
        input.reason,
        None,
    )
    .await
}

#[poise::command(
    context_menu_command = "Timeout User (Message)",
    guild_only,
    default_member_permissions = "MODERATE_MEMBERS",
    category = "Moderation"
)]
pub async fn timeout_message(
    ctx: ApplicationContext<'_>,
    message: serenity::Message,
) -> Result<(), Error> {
    let Some(input) = TimeoutModal::execute(ctx).await? else {
        return Ok(());
    };

    moderate(
        poise::Context::Application(ctx),
        message.author.id,
        Sanction::Timeout {
            duration_raw: input.duration,
        },
        input.reason,
        Some(excerpt_of(&message)),
    )
    .await
}

/// Shared tail of every entry point: resolve the member, build the request,
/// run the executor, edit the deferred ephemeral reply with the outcome.
async fn moderate(
    ctx: Context<'_>,
    target_id: serenity::UserId,
    sanction: Sanction,
    reason: Option<String>,
    triggering_message: Option<MessageExcerpt>,
) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        return say_ephemeral(ctx, "❌ This only works in a server.").await;
    };

    let Ok(target) = guild_id.member(ctx, target_id).await else {
        return say_ephemeral(ctx, "❌ User not found!").await;
    };

    let executor_display_name = match ctx.author_member().await {
        Some(member) => member.display_name().to_owned(),
        None => ctx.author().display_name().to_owned(),
    };

    let request = ModerationRequest {
        target_user_id: target.user.id.get(),
        target_display_name: target.display_name().to_owned(),
        executor_display_name,
        guild_name: ctx.data().settings.application.guild_name.clone(),
        reason: reason.filter(|r| !r.trim().is_empty()),
        sanction,
        triggering_message,
    };

    let gateway = SerenityGateway {
        http: ctx.serenity_context().http.clone(),
        guild_id,
    };

    let outcome = match moderation::execute(
        &gateway,
        request,
        chrono::Utc::now().timestamp_millis(),
    )
    .await
    {
        Ok(report) => report.operator_summary(),
        Err(error) => error.to_string(),
    };

    say_ephemeral(ctx, outcome).await
}

fn excerpt_of(message: &serenity::Message) -> MessageExcerpt {
    MessageExcerpt {
        author_display_name: message.author.display_name().to_owned(),
        body: message.content.clone(),
        created_at_epoch_secs: message.timestamp.unix_timestamp(),
        permalink: message.link(),
    }
}

fn parse_history_hours(raw: Option<String>) -> Option<u32> {
    raw.as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())?
        .parse()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::{parse_history_hours, HistoryWindow};

    #[test]
    fn choice_values_match_the_enumerated_windows() {
        let hours: Vec<u32> = [
            HistoryWindow::None,
            HistoryWindow::Hour,
            HistoryWindow::SixHours,
            HistoryWindow::TwelveHours,
            HistoryWindow::Day,
            HistoryWindow::ThreeDays,
            HistoryWindow::Week,
        ]
        .into_iter()
        .map(HistoryWindow::hours)
        .collect();

        assert_eq!(hours, vec![0, 1, 6, 12, 24, 72, 168]);
    }

    #[test]
    fn modal_hours_input_tolerates_whitespace_but_not_garbage() {
        assert_eq!(parse_history_hours(Some(" 6 ".to_owned())), Some(6));
        assert_eq!(parse_history_hours(Some("abc".to_owned())), None);
        assert_eq!(parse_history_hours(Some(String::new())), None);
        assert_eq!(parse_history_hours(None), None);
    }
}
