//! Booster role lifecycle: one cosmetic role per boosting member, created
//! through self-service and reaped by a daily reconciliation sweep once the
//! member stops boosting or leaves.

use poise::serenity_prelude::{self as serenity, EditRole, GuildId, RoleId, UserId};
use sqlx::PgPool;
use tracing::{info, warn};

use crate::util::database;
use crate::Error;

/// What the self-service flow should do, decided from the stored binding.
/// An existing binding always means editing that same role, never creating
/// a second one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RolePlan {
    Edit(RoleId),
    Create,
}

pub fn plan_role_action(existing: Option<&database::BoostRoleBinding>) -> RolePlan {
    match existing {
        Some(binding) => RolePlan::Edit(RoleId::new(binding.role_id as u64)),
        None => RolePlan::Create,
    }
}

/// Membership probe result for one binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberStatus {
    Gone,
    NotBoosting,
    Boosting,
}

impl MemberStatus {
    /// A binding is stale unless its member is present and still boosting.
    pub fn is_stale(self) -> bool {
        !matches!(self, Self::Boosting)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum BoostRoleOutcome {
    Updated(RoleId),
    Created(RoleId),
    /// The stored role no longer exists; the binding was dropped and the
    /// member has to re-run the command.
    MissingRole,
}

/// Creates or edits the member's boost role and keeps the binding in sync.
pub async fn apply_boost_role(
    http: &serenity::Http,
    pool: &PgPool,
    guild_id: GuildId,
    anchor_role_id: RoleId,
    member: &serenity::Member,
    name: &str,
    color: u32,
) -> Result<BoostRoleOutcome, Error> {
    let user_id = member.user.id.get() as i64;
    let binding = database::get_boost_role(pool, user_id).await?;
    let roles = guild_id.roles(http).await?;

    match plan_role_action(binding.as_ref()) {
        RolePlan::Edit(role_id) => {
            if !roles.contains_key(&role_id) {
                warn!(user_id, %role_id, "bound boost role vanished, dropping binding");
                database::delete_boost_role(pool, user_id).await?;
                return Ok(BoostRoleOutcome::MissingRole);
            }

            guild_id
                .edit_role(
                    http,
                    role_id,
                    EditRole::new()
                        .name(name)
                        .colour(serenity::Colour::new(color))
                        .audit_log_reason(&format!(
                            "Boost role updated by {}",
                            member.user.tag()
                        )),
                )
                .await?;

            Ok(BoostRoleOutcome::Updated(role_id))
        }
        RolePlan::Create => {
            let anchor = roles
                .get(&anchor_role_id)
                .ok_or("boost anchor role not found in guild")?;

            let role = guild_id
                .create_role(
                    http,
                    EditRole::new()
                        .name(name)
                        .colour(serenity::Colour::new(color))
                        .hoist(false)
                        .mentionable(false)
                        .position(anchor.position)
                        .audit_log_reason(&format!(
                            "Boost role created by {}",
                            member.user.tag()
                        )),
                )
                .await?;

            database::insert_boost_role(pool, user_id, role.id.get() as i64).await?;
            http.add_member_role(
                guild_id,
                member.user.id,
                role.id,
                Some("Assigning boost role to member"),
            )
            .await?;

            Ok(BoostRoleOutcome::Created(role.id))
        }
    }
}

/// `#RRGGBB` (the leading `#` is optional).
pub fn parse_hex_color(raw: &str) -> Option<u32> {
    let trimmed = raw.trim();
    let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);

    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    u32::from_str_radix(digits, 16).ok()
}

/// The daily sweep: for every binding, delete the role and drop the row if
/// the member left the guild or is no longer boosting. Role deletion is
/// best effort; the binding goes regardless so the member can start over.
pub async fn reconcile_boost_roles(
    http: &serenity::Http,
    pool: &PgPool,
    guild_id: GuildId,
) -> Result<(), Error> {
    let bindings = database::list_boost_roles(pool).await?;
    info!("reconciling {} boost role bindings", bindings.len());

    for binding in bindings {
        let status = match guild_id
            .member(http, UserId::new(binding.user_id as u64))
            .await
        {
            Err(_) => MemberStatus::Gone,
            Ok(member) if member.premium_since.is_some() => MemberStatus::Boosting,
            Ok(_) => MemberStatus::NotBoosting,
        };

        if !status.is_stale() {
            continue;
        }

        info!(
            user_id = binding.user_id,
            role_id = binding.role_id,
            ?status,
            "removing stale boost role"
        );

        let role_id = RoleId::new(binding.role_id as u64);
        if let Err(e) = http
            .delete_role(
                guild_id,
                role_id,
                Some("Member left or is no longer boosting."),
            )
            .await
        {
            warn!(%role_id, "could not delete boost role: {e}");
        }

        database::delete_boost_role(pool, binding.user_id).await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::database::BoostRoleBinding;

    #[test]
    fn existing_binding_always_edits_the_same_role() {
        let binding = BoostRoleBinding {
            user_id: 7,
            role_id: 1234,
        };

        assert_eq!(
            plan_role_action(Some(&binding)),
            RolePlan::Edit(RoleId::new(1234))
        );
        assert_eq!(plan_role_action(None), RolePlan::Create);
    }

    #[test]
    fn only_boosting_members_keep_their_roles() {
        assert!(MemberStatus::Gone.is_stale());
        assert!(MemberStatus::NotBoosting.is_stale());
        assert!(!MemberStatus::Boosting.is_stale());
    }

    #[test]
    fn hex_colors_parse_with_or_without_the_hash() {
        assert_eq!(parse_hex_color("#00FFFF"), Some(0x00FFFF));
        assert_eq!(parse_hex_color("ff8800"), Some(0xFF8800));
        assert_eq!(parse_hex_color(" #FFFFFF "), Some(0xFFFFFF));
    }

    #[test]
    fn bad_hex_colors_are_rejected() {
        assert_eq!(parse_hex_color("#FFF"), None);
        assert_eq!(parse_hex_color("red"), None);
        assert_eq!(parse_hex_color("#GGGGGG"), None);
        assert_eq!(parse_hex_color(""), None);
    }
}
