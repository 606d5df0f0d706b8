//! Shared seeding helpers for repository tests.

use lectra_core::types::DbId;
use sqlx::PgPool;

/// Insert a user and return its id. The email is derived from the name, so
/// names must be unique within one test.
pub async fn seed_user(pool: &PgPool, name: &str, role: &str) -> DbId {
    sqlx::query_scalar(
        "INSERT INTO users (name, email, role) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(name)
    .bind(format!("{name}@example.edu"))
    .bind(role)
    .fetch_one(pool)
    .await
    .expect("seed user")
}
