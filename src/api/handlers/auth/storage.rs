//! Database helpers for users.
//!
//! A user row is written once at registration and never mutated by this
//! subsystem. Concurrent registrations racing on the same email are
//! serialized by the unique constraint; the losing writer gets a conflict,
//! never an overwrite.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use tracing::Instrument;
use uuid::Uuid;

/// Outcome when attempting to create a new user row.
#[derive(Debug)]
pub(super) enum SignupOutcome {
    Created(UserRecord),
    Conflict,
}

/// A persisted user. Fully formed at creation, immutable thereafter.
#[derive(Debug, Clone)]
pub(crate) struct UserRecord {
    pub(crate) id: Uuid,
    pub(crate) email: String,
    pub(crate) password_hash: String,
    #[allow(dead_code)]
    pub(crate) seed_key: String,
    pub(crate) seed_hash: String,
    pub(crate) created_at: DateTime<Utc>,
}

fn row_to_user(row: &sqlx::postgres::PgRow) -> UserRecord {
    UserRecord {
        id: row.get("id"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        seed_key: row.get("seed_key"),
        seed_hash: row.get("seed_hash"),
        created_at: row.get("created_at"),
    }
}

pub(super) async fn insert_user(
    pool: &PgPool,
    email: &str,
    password_hash: &str,
    seed_key: &str,
    seed_hash: &str,
) -> Result<SignupOutcome> {
    let query = r"
        INSERT INTO users
            (email, password_hash, seed_key, seed_hash)
        VALUES ($1, $2, $3, $4)
        RETURNING id, email, password_hash, seed_key, seed_hash, created_at
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(email)
        .bind(password_hash)
        .bind(seed_key)
        .bind(seed_hash)
        .fetch_one(pool)
        .instrument(span)
        .await;

    match row {
        Ok(row) => Ok(SignupOutcome::Created(row_to_user(&row))),
        Err(err) if is_unique_violation(&err) => Ok(SignupOutcome::Conflict),
        Err(err) => Err(err).context("failed to insert user"),
    }
}

pub(super) async fn lookup_user_by_email(pool: &PgPool, email: &str) -> Result<Option<UserRecord>> {
    lookup_user(pool, "email", email).await
}

/// Indexed equality lookup on the deterministic seed key; no table scan.
pub(super) async fn lookup_user_by_seed_key(
    pool: &PgPool,
    seed_key: &str,
) -> Result<Option<UserRecord>> {
    lookup_user(pool, "seed_key", seed_key).await
}

async fn lookup_user(pool: &PgPool, column: &str, value: &str) -> Result<Option<UserRecord>> {
    // `column` is one of two fixed identifiers, never user input.
    let query = format!(
        "SELECT id, email, password_hash, seed_key, seed_hash, created_at FROM users WHERE {column} = $1"
    );
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query.as_str()
    );
    let row = sqlx::query(&query)
        .bind(value)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .with_context(|| format!("failed to lookup user by {column}"))?;

    Ok(row.map(|row| row_to_user(&row)))
}

pub(crate) async fn lookup_user_by_id(pool: &PgPool, id: Uuid) -> Result<Option<UserRecord>> {
    let query =
        "SELECT id, email, password_hash, seed_key, seed_hash, created_at FROM users WHERE id = $1";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(id)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to lookup user by id")?;

    Ok(row.map(|row| row_to_user(&row)))
}

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::error::{DatabaseError, ErrorKind};
    use std::borrow::Cow;
    use std::error::Error as StdError;
    use std::fmt;

    #[derive(Debug)]
    struct TestDbError {
        code: Option<&'static str>,
    }

    impl fmt::Display for TestDbError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "test database error")
        }
    }

    impl StdError for TestDbError {}

    impl DatabaseError for TestDbError {
        fn message(&self) -> &'static str {
            "test database error"
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            self.code.map(Cow::Borrowed)
        }

        fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> ErrorKind {
            ErrorKind::UniqueViolation
        }
    }

    #[test]
    fn is_unique_violation_matches_sqlstate() {
        let err = sqlx::Error::Database(Box::new(TestDbError {
            code: Some("23505"),
        }));
        assert!(is_unique_violation(&err));

        let err = sqlx::Error::Database(Box::new(TestDbError {
            code: Some("99999"),
        }));
        assert!(!is_unique_violation(&err));

        let err = sqlx::Error::RowNotFound;
        assert!(!is_unique_violation(&err));
    }
}
