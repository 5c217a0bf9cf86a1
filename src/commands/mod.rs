use poise::CreateReply;

use crate::{Context, Error};

pub mod boostrole;
pub mod misc;
pub mod moderation;
pub mod tags;

pub(crate) async fn say_ephemeral(
    ctx: Context<'_>,
    content: impl Into<String>,
) -> Result<(), Error> {
    ctx.send(CreateReply::default().ephemeral(true).content(content.into()))
        .await?;

    Ok(())
}
