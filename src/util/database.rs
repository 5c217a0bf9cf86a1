//! Queries for the `user_roles` table, the one piece of persisted state:
//! which cosmetic role belongs to which boosting member.

use sqlx::PgPool;

use crate::Error;

/// One row per member who created a custom boost role.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct BoostRoleBinding {
    pub user_id: i64,
    pub role_id: i64,
}

pub async fn get_boost_role(
    pool: &PgPool,
    user_id: i64,
) -> Result<Option<BoostRoleBinding>, Error> {
    let binding = sqlx::query_as::<_, BoostRoleBinding>(
        "SELECT user_id, role_id FROM user_roles WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(binding)
}

pub async fn list_boost_roles(pool: &PgPool) -> Result<Vec<BoostRoleBinding>, Error> {
    let bindings =
        sqlx::query_as::<_, BoostRoleBinding>("SELECT user_id, role_id FROM user_roles")
            .fetch_all(pool)
            .await?;

    Ok(bindings)
}

pub async fn insert_boost_role(pool: &PgPool, user_id: i64, role_id: i64) -> Result<(), Error> {
    sqlx::query("INSERT INTO user_roles (user_id, role_id) VALUES ($1, $2)")
        .bind(user_id)
        .bind(role_id)
        .execute(pool)
        .await?;

    Ok(())
}

pub async fn delete_boost_role(pool: &PgPool, user_id: i64) -> Result<(), Error> {
    sqlx::query("DELETE FROM user_roles WHERE user_id = $1")
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(())
}
