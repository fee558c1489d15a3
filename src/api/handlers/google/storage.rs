//! Persistence for the single Google connection.
//!
//! The connection table holds one row with a fixed id. An upsert replaces
//! everything except the refresh token handling, which the callback resolves
//! before writing.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use tracing::Instrument;

const CONNECTION_ID: &str = "default";

#[derive(Debug, Clone)]
pub(super) struct GoogleConnection {
    pub(super) email: Option<String>,
    pub(super) sub: Option<String>,
    pub(super) access_token: String,
    pub(super) refresh_token: Option<String>,
    pub(super) token_type: Option<String>,
    pub(super) scope: Option<String>,
    pub(super) expires_at: Option<DateTime<Utc>>,
}

pub(super) async fn get_connection(pool: &PgPool) -> Result<Option<GoogleConnection>> {
    let query = r"
        SELECT email, sub, access_token, refresh_token, token_type, scope, expires_at
        FROM google_connections WHERE id = $1
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(CONNECTION_ID)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to load google connection")?;

    Ok(row.map(|row| GoogleConnection {
        email: row.get("email"),
        sub: row.get("sub"),
        access_token: row.get("access_token"),
        refresh_token: row.get("refresh_token"),
        token_type: row.get("token_type"),
        scope: row.get("scope"),
        expires_at: row.get("expires_at"),
    }))
}

pub(super) async fn upsert_connection(pool: &PgPool, connection: &GoogleConnection) -> Result<()> {
    let query = r"
        INSERT INTO google_connections
            (id, email, sub, access_token, refresh_token, token_type, scope, expires_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, now())
        ON CONFLICT (id) DO UPDATE SET
            email = EXCLUDED.email,
            sub = EXCLUDED.sub,
            access_token = EXCLUDED.access_token,
            refresh_token = EXCLUDED.refresh_token,
            token_type = EXCLUDED.token_type,
            scope = EXCLUDED.scope,
            expires_at = EXCLUDED.expires_at,
            updated_at = now()
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );
    sqlx::query(query)
        .bind(CONNECTION_ID)
        .bind(&connection.email)
        .bind(&connection.sub)
        .bind(&connection.access_token)
        .bind(&connection.refresh_token)
        .bind(&connection.token_type)
        .bind(&connection.scope)
        .bind(connection.expires_at)
        .execute(pool)
        .instrument(span)
        .await
        .context("failed to upsert google connection")?;

    Ok(())
}

pub(super) async fn delete_connection(pool: &PgPool) -> Result<()> {
    let query = "DELETE FROM google_connections WHERE id = $1";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "DELETE",
        db.statement = query
    );
    sqlx::query(query)
        .bind(CONNECTION_ID)
        .execute(pool)
        .instrument(span)
        .await
        .context("failed to delete google connection")?;

    Ok(())
}
