/// Server-side technician sessions
///
/// The browser only ever holds the opaque token (see
/// [`crate::auth::session`]); the database stores its SHA-256 hash together
/// with the technician's identity and display name.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE technician_sessions (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     token_hash CHAR(64) NOT NULL UNIQUE,
///     technician_id UUID NOT NULL REFERENCES technicians(id) ON DELETE CASCADE,
///     display_name VARCHAR(255) NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     expires_at TIMESTAMPTZ NOT NULL
/// );
/// ```

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// A live login session
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Session {
    /// Session row ID
    pub id: Uuid,

    /// SHA-256 of the cookie token
    #[serde(skip_serializing)]
    pub token_hash: String,

    /// Technician the session belongs to
    pub technician_id: Uuid,

    /// Display name captured at login
    pub display_name: String,

    /// When the session was opened
    pub created_at: DateTime<Utc>,

    /// After this instant the session is ignored
    pub expires_at: DateTime<Utc>,
}

/// Input for opening a session
#[derive(Debug, Clone)]
pub struct CreateSession {
    /// SHA-256 of the token handed to the browser
    pub token_hash: String,

    /// Authenticated technician
    pub technician_id: Uuid,

    /// Display name to remember
    pub display_name: String,

    /// Session lifetime
    pub ttl: Duration,
}

impl Session {
    /// Opens a session.
    pub async fn create(pool: &PgPool, data: CreateSession) -> Result<Self, sqlx::Error> {
        let expires_at = Utc::now() + data.ttl;

        sqlx::query_as::<_, Session>(
            r#"
            INSERT INTO technician_sessions (token_hash, technician_id, display_name, expires_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, token_hash, technician_id, display_name, created_at, expires_at
            "#,
        )
        .bind(data.token_hash)
        .bind(data.technician_id)
        .bind(data.display_name)
        .bind(expires_at)
        .fetch_one(pool)
        .await
    }

    /// Finds an unexpired session by token hash.
    pub async fn find_active(pool: &PgPool, token_hash: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Session>(
            r#"
            SELECT id, token_hash, technician_id, display_name, created_at, expires_at
            FROM technician_sessions
            WHERE token_hash = $1 AND expires_at > NOW()
            "#,
        )
        .bind(token_hash)
        .fetch_optional(pool)
        .await
    }

    /// Deletes the session identified by a token hash, expired or not.
    ///
    /// Returns `false` when nothing matched, which logout treats as success.
    pub async fn delete_by_token_hash(pool: &PgPool, token_hash: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM technician_sessions WHERE token_hash = $1")
            .bind(token_hash)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Purges expired sessions and returns how many were removed.
    pub async fn delete_expired(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM technician_sessions WHERE expires_at <= NOW()")
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }
}
