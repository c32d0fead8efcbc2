/// Technician account model
///
/// Technicians are provisioned by an administrative process; this service
/// only looks them up at login and records the last login time.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE technicians (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     email VARCHAR(255) NOT NULL UNIQUE,
///     password_hash VARCHAR(255) NOT NULL,
///     display_name VARCHAR(255) NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     last_login_at TIMESTAMPTZ
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// A technician allowed to sign in to the catalogue
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Technician {
    /// Unique technician ID
    pub id: Uuid,

    /// Login email, matched exactly
    pub email: String,

    /// Argon2id PHC string
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Name shown in the interface ("nom prénom")
    pub display_name: String,

    /// When the account was provisioned
    pub created_at: DateTime<Utc>,

    /// Last successful login, if any
    pub last_login_at: Option<DateTime<Utc>>,
}

/// Input for provisioning a technician
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTechnician {
    /// Login email
    pub email: String,

    /// Argon2id hash (never the plaintext password)
    pub password_hash: String,

    /// Display name
    pub display_name: String,
}

impl Technician {
    /// Inserts a technician. Used by provisioning tooling and tests.
    ///
    /// # Errors
    ///
    /// Fails on a duplicate email (unique constraint) or a database error.
    pub async fn create(pool: &PgPool, data: CreateTechnician) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Technician>(
            r#"
            INSERT INTO technicians (email, password_hash, display_name)
            VALUES ($1, $2, $3)
            RETURNING id, email, password_hash, display_name, created_at, last_login_at
            "#,
        )
        .bind(data.email)
        .bind(data.password_hash)
        .bind(data.display_name)
        .fetch_one(pool)
        .await
    }

    /// Finds a technician by exact email.
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Technician>(
            r#"
            SELECT id, email, password_hash, display_name, created_at, last_login_at
            FROM technicians
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await
    }

    /// Finds a technician by ID.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Technician>(
            r#"
            SELECT id, email, password_hash, display_name, created_at, last_login_at
            FROM technicians
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Stamps `last_login_at` with the current time.
    ///
    /// Returns `false` if no technician has that ID.
    pub async fn update_last_login(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE technicians SET last_login_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Removes a technician and, by cascade, their sessions.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM technicians WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
