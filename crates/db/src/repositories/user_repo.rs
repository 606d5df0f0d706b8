//! Repository for the `users` table.
//!
//! Only the operations this service needs: role lookup and the bulk admin
//! actions. Account creation and credentials are another system's job.

use sqlx::PgPool;

use lectra_core::types::DbId;

use crate::models::user::UserAccount;

/// Column list for `users` queries.
const COLUMNS: &str = "id, name, email, role, is_active, created_at";

/// Provides lookup and bulk mutation of user accounts.
pub struct UserRepo;

impl UserRepo {
    /// Fetch a user by id.
    pub async fn find(pool: &PgPool, id: DbId) -> Result<Option<UserAccount>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, UserAccount>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Of `ids`, the subset that exists. Used to report skipped targets.
    pub async fn existing_ids(pool: &PgPool, ids: &[DbId]) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar("SELECT id FROM users WHERE id = ANY($1) ORDER BY id")
            .bind(ids)
            .fetch_all(pool)
            .await
    }

    /// Bulk-set the active flag. Returns the number of rows changed.
    pub async fn set_active(
        pool: &PgPool,
        ids: &[DbId],
        is_active: bool,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET is_active = $2 WHERE id = ANY($1)")
            .bind(ids)
            .bind(is_active)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Bulk role assignment. Returns the number of rows changed.
    pub async fn set_role(pool: &PgPool, ids: &[DbId], role: &str) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET role = $2 WHERE id = ANY($1)")
            .bind(ids)
            .bind(role)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Bulk deletion. Returns the number of rows removed.
    pub async fn delete_many(pool: &PgPool, ids: &[DbId]) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = ANY($1)")
            .bind(ids)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
