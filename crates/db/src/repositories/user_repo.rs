//! Repository for the `users` table.

use addonhub_core::roles::ROLE_ADMIN;
use addonhub_core::types::DbId;
use sqlx::PgPool;

use crate::models::user::{CreateUser, User};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, username, email, role_id, is_active, created_at, updated_at";

/// Provides user lookups and role checks.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (username, email, role_id) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.username)
            .bind(&input.email)
            .bind(input.role_id)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Resolve a role name to its id.
    pub async fn role_id(pool: &PgPool, role_name: &str) -> Result<Option<DbId>, sqlx::Error> {
        sqlx::query_scalar("SELECT id FROM roles WHERE name = $1")
            .bind(role_name)
            .fetch_optional(pool)
            .await
    }

    /// Whether the user exists, is active and holds the admin role.
    pub async fn is_admin(pool: &PgPool, user_id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS ( \
                 SELECT 1 FROM users u \
                 JOIN roles r ON r.id = u.role_id \
                 WHERE u.id = $1 AND u.is_active = true AND r.name = $2 \
             )",
        )
        .bind(user_id)
        .bind(ROLE_ADMIN)
        .fetch_one(pool)
        .await
    }
}
