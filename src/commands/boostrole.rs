use poise::serenity_prelude::{GuildId, RoleId};
use poise::Modal;
use tracing::instrument;
use uuid::Uuid;

use crate::boost::{self, BoostRoleOutcome};
use crate::commands::say_ephemeral;
use crate::{ApplicationContext, Error};

#[derive(Debug, Modal)]
#[name = "Customize your Boost Role"]
struct BoostRoleModal {
    #[name = "The name of the role"]
    #[placeholder = "My role"]
    #[max_length = 100]
    name: String,
    #[name = "The color of the role (hex, e.g. #00FFFF)"]
    #[placeholder = "#FFFFFF"]
    #[min_length = 6]
    #[max_length = 7]
    color: String,
}

/// Configures your boost role.
#[instrument(skip(actx), fields(request_id = %Uuid::new_v4()))]
#[poise::command(slash_command, guild_only, category = "Utility")]
pub async fn boostrole(actx: ApplicationContext<'_>) -> Result<(), Error> {
    let ctx = poise::Context::Application(actx);
    let settings = &ctx.data().settings.application;
    let guild_id = GuildId::new(settings.guild_id);

    let Ok(member) = guild_id.member(ctx, ctx.author().id).await else {
        return say_ephemeral(ctx, "❌ You weren't found in the guild!").await;
    };

    if member.premium_since.is_none() {
        return say_ephemeral(ctx, "❌ You are not boosting the server!").await;
    }

    let Some(input) = BoostRoleModal::execute(actx).await? else {
        return Ok(());
    };

    let Some(color) = boost::parse_hex_color(&input.color) else {
        return say_ephemeral(
            ctx,
            "❌ Please make sure the color is a valid HEX code (e.g. #00FFFF) and try again.",
        )
        .await;
    };

    let outcome = boost::apply_boost_role(
        &ctx.serenity_context().http,
        &ctx.data().database,
        guild_id,
        RoleId::new(settings.boost_anchor_role_id),
        &member,
        input.name.trim(),
        color,
    )
    .await?;

    let reply = match outcome {
        BoostRoleOutcome::Updated(role_id) => {
            format!("✅ Your boost role has been updated: <@&{role_id}>")
        }
        BoostRoleOutcome::Created(role_id) => {
            format!("✅ Your boost role has been created and assigned: <@&{role_id}>")
        }
        BoostRoleOutcome::MissingRole => {
            "❌ Your previous boost role was not found; it may have been deleted. Please re-run \
             the command."
                .to_owned()
        }
    };

    say_ephemeral(ctx, reply).await
}
