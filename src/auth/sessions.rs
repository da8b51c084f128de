// src/auth/sessions.rs
use rusqlite::{params, Connection, OptionalExtension};

use crate::auth::token::hash_token;
use crate::errors::ServerError;

pub const SESSION_TTL_SECS: i64 = 60 * 60 * 24 * 7; // 7 days

/// Issue a session for a profile and return the raw bearer token.
/// Only the SHA-256 of the token is stored.
pub fn create_session(
    conn: &Connection,
    profile_id: &str,
    raw_token: &str,
    now: i64,
) -> Result<(), ServerError> {
    let hash = hash_token(raw_token);
    let expires_at = now + SESSION_TTL_SECS;

    conn.execute(
        r#"
        insert into sessions (profile_id, token_hash, created_at, expires_at)
        values (?, ?, ?, ?)
        "#,
        params![profile_id, hash.as_slice(), now, expires_at],
    )
    .map_err(|e| ServerError::DbError(format!("create session failed: {e}")))?;

    Ok(())
}

/// Resolve a bearer token to a profile id, if the session is live.
pub fn profile_id_from_session(
    conn: &Connection,
    raw_token: &str,
    now: i64,
) -> Result<Option<String>, ServerError> {
    let hash = hash_token(raw_token);

    conn.query_row(
        r#"
        select p.id
        from sessions s
        join profiles p on p.id = s.profile_id
        where s.token_hash = ?
          and s.expires_at > ?
          and s.revoked_at is null
        "#,
        params![hash.as_slice(), now],
        |row| row.get(0),
    )
    .optional()
    .map_err(|e| ServerError::DbError(format!("session lookup failed: {e}")))
}
