//! Gateway event handling: triage-tagging new forum threads and the
//! role-granting access buttons under the forum rules posts.

use poise::serenity_prelude::{
    self as serenity, ComponentInteraction, CreateInteractionResponse,
    CreateInteractionResponseMessage, EditThread, ForumTagId, FullEvent, RoleId,
};
use tracing::{info, warn};

use crate::config::ForumSettings;
use crate::{Data, Error};

pub const BUG_REPORTS_ALLOW_ID: &str = "bug_reports_allow";
pub const FEATURE_REQUESTS_ALLOW_ID: &str = "feature_requests_allow";

pub async fn event_handler(
    ctx: &serenity::Context,
    event: &FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    match event {
        FullEvent::ThreadCreate { thread } => {
            tag_new_forum_thread(ctx, &data.settings.application.forums, thread).await?;
        }
        FullEvent::InteractionCreate {
            interaction: serenity::Interaction::Component(component),
        } => {
            handle_access_button(ctx, &data.settings.application.forums, component).await?;
        }
        _ => {}
    }

    Ok(())
}

/// Looks up the triage tag for the forum the thread was created in, if any.
fn triage_tag_for(forums: &ForumSettings, parent_id: serenity::ChannelId) -> Option<ForumTagId> {
    if forums.bug_reports_channel_id == Some(parent_id.get()) {
        return forums.bug_reports_triage_tag_id.map(ForumTagId::new);
    }

    if forums.feature_requests_channel_id == Some(parent_id.get()) {
        return forums.feature_requests_triage_tag_id.map(ForumTagId::new);
    }

    None
}

async fn tag_new_forum_thread(
    ctx: &serenity::Context,
    forums: &ForumSettings,
    thread: &serenity::GuildChannel,
) -> Result<(), Error> {
    let Some(parent_id) = thread.parent_id else {
        return Ok(());
    };

    let Some(tag_id) = triage_tag_for(forums, parent_id) else {
        return Ok(());
    };

    if thread.applied_tags.contains(&tag_id) {
        return Ok(());
    }

    let mut tags = thread.applied_tags.clone();
    tags.push(tag_id);

    info!(thread_id = %thread.id, %tag_id, "tagging new forum thread for triage");

    thread
        .id
        .edit_thread(&ctx.http, EditThread::new().applied_tags(tags))
        .await?;

    Ok(())
}

async fn handle_access_button(
    ctx: &serenity::Context,
    forums: &ForumSettings,
    component: &ComponentInteraction,
) -> Result<(), Error> {
    let role_id = match component.data.custom_id.as_str() {
        BUG_REPORTS_ALLOW_ID => forums.bug_reports_access_role_id,
        FEATURE_REQUESTS_ALLOW_ID => forums.feature_requests_access_role_id,
        _ => return Ok(()),
    };

    let Some(role_id) = role_id.map(RoleId::new) else {
        warn!(
            custom_id = %component.data.custom_id,
            "access button pressed but no role is configured"
        );
        return Ok(());
    };

    let Some(guild_id) = component.guild_id else {
        return Ok(());
    };

    if component
        .member
        .as_ref()
        .is_some_and(|member| member.roles.contains(&role_id))
    {
        component
            .create_response(
                &ctx.http,
                CreateInteractionResponse::Message(
                    CreateInteractionResponseMessage::new()
                        .ephemeral(true)
                        .content("You already have access!"),
                ),
            )
            .await?;

        return Ok(());
    }

    ctx.http
        .add_member_role(
            guild_id,
            component.user.id,
            role_id,
            Some("Forum access requested via button"),
        )
        .await?;

    component
        .create_response(
            &ctx.http,
            CreateInteractionResponse::Message(
                CreateInteractionResponseMessage::new()
                    .ephemeral(true)
                    .content(format!("✅ You now have access: <@&{role_id}>")),
            ),
        )
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forums() -> ForumSettings {
        ForumSettings {
            bug_reports_channel_id: Some(100),
            bug_reports_triage_tag_id: Some(200),
            bug_reports_access_role_id: Some(300),
            feature_requests_channel_id: Some(101),
            feature_requests_triage_tag_id: None,
            feature_requests_access_role_id: None,
        }
    }

    #[test]
    fn threads_in_configured_forums_get_their_triage_tag() {
        assert_eq!(
            triage_tag_for(&forums(), serenity::ChannelId::new(100)),
            Some(ForumTagId::new(200))
        );
    }

    #[test]
    fn forums_without_a_tag_or_unknown_channels_are_ignored() {
        // configured channel, but no tag set
        assert_eq!(triage_tag_for(&forums(), serenity::ChannelId::new(101)), None);
        assert_eq!(triage_tag_for(&forums(), serenity::ChannelId::new(999)), None);
    }
}
