//! Database helpers for accounts and sessions.

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use tracing::Instrument;

use super::utils::generate_session_id;

/// Account row as needed by the login handler.
pub(super) struct AccountRecord {
    pub(super) id: i64,
    pub(super) email: String,
    pub(super) name: String,
    pub(super) role: String,
    pub(super) password_hash: String,
}

/// Session row joined with its owning account. `expires_at` is returned even
/// for expired rows so the caller can distinguish "expired" from "not found".
pub(crate) struct SessionRow {
    pub(crate) account_id: i64,
    pub(crate) email: String,
    pub(crate) name: String,
    pub(crate) role: String,
    pub(crate) expires_at: DateTime<Utc>,
}

pub(super) async fn lookup_account(pool: &PgPool, email: &str) -> Result<Option<AccountRecord>> {
    // Emails are stored lowercase; callers normalize before lookup.
    let query = "SELECT id, email, name, role, password_hash FROM admin_accounts WHERE email = $1";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(email)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to lookup account")?;

    Ok(row.map(|row| AccountRecord {
        id: row.get("id"),
        email: row.get("email"),
        name: row.get("name"),
        role: row.get("role"),
        password_hash: row.get("password_hash"),
    }))
}

pub(super) async fn lookup_password_hash(pool: &PgPool, account_id: i64) -> Result<Option<String>> {
    let query = "SELECT password_hash FROM admin_accounts WHERE id = $1";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(account_id)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to lookup password hash")?;
    Ok(row.map(|row| row.get("password_hash")))
}

pub(super) async fn update_password_hash(
    pool: &PgPool,
    account_id: i64,
    password_hash: &str,
) -> Result<()> {
    let query = "UPDATE admin_accounts SET password_hash = $2 WHERE id = $1";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    sqlx::query(query)
        .bind(account_id)
        .bind(password_hash)
        .execute(pool)
        .instrument(span)
        .await
        .context("failed to update password hash")?;
    Ok(())
}

pub(super) async fn touch_last_login(pool: &PgPool, account_id: i64) -> Result<()> {
    let query = "UPDATE admin_accounts SET last_login = NOW() WHERE id = $1";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    sqlx::query(query)
        .bind(account_id)
        .execute(pool)
        .instrument(span)
        .await
        .context("failed to update last login")?;
    Ok(())
}

/// Mint a session: generate an identifier, persist it with the TTL, and
/// return it together with the absolute expiry.
pub(super) async fn insert_session(
    pool: &PgPool,
    account_id: i64,
    ttl_seconds: i64,
) -> Result<(String, DateTime<Utc>)> {
    let query = r"
        INSERT INTO sessions (id, account_id, expires_at)
        VALUES ($1, $2, NOW() + ($3 * INTERVAL '1 second'))
        RETURNING expires_at
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );

    // Identifier collisions are negligible at 256 bits, but the primary key
    // makes a duplicate insert fail loudly, so retry a couple of times.
    for _ in 0..3 {
        let session_id = generate_session_id()?;
        let result = sqlx::query(query)
            .bind(&session_id)
            .bind(account_id)
            .bind(ttl_seconds)
            .fetch_one(pool)
            .instrument(span.clone())
            .await;

        match result {
            Ok(row) => return Ok((session_id, row.get("expires_at"))),
            Err(err) if is_unique_violation(&err) => {}
            Err(err) => return Err(err).context("failed to insert session"),
        }
    }

    Err(anyhow!("failed to generate unique session identifier"))
}

pub(super) async fn lookup_session(
    pool: &PgPool,
    session_id: &str,
) -> Result<Option<SessionRow>> {
    // Expiry is checked by the caller, not in SQL, so expired rows are still
    // reported distinctly from missing ones.
    let query = r"
        SELECT sessions.account_id, sessions.expires_at,
               admin_accounts.email, admin_accounts.name, admin_accounts.role
        FROM sessions
        JOIN admin_accounts ON admin_accounts.id = sessions.account_id
        WHERE sessions.id = $1
        LIMIT 1
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(session_id)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to lookup session")?;

    Ok(row.map(|row| SessionRow {
        account_id: row.get("account_id"),
        email: row.get("email"),
        name: row.get("name"),
        role: row.get("role"),
        expires_at: row.get("expires_at"),
    }))
}

pub(super) async fn delete_session(pool: &PgPool, session_id: &str) -> Result<()> {
    // Logout is idempotent; it's fine if no rows are deleted.
    let query = "DELETE FROM sessions WHERE id = $1";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "DELETE",
        db.statement = query
    );
    sqlx::query(query)
        .bind(session_id)
        .execute(pool)
        .instrument(span)
        .await
        .context("failed to delete session")?;
    Ok(())
}

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}
