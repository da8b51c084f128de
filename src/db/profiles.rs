// src/db/profiles.rs
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::domain::profile::{Profile, ProfileUpdate};
use crate::errors::ServerError;

pub const DEFAULT_UNIVERSITY: &str = "Baylor University";

pub(crate) fn row_to_profile(row: &Row<'_>) -> rusqlite::Result<Profile> {
    row_to_profile_at(row, 0)
}

/// Map a profile whose columns start at `base` in a joined select.
pub(crate) fn row_to_profile_at(row: &Row<'_>, base: usize) -> rusqlite::Result<Profile> {
    Ok(Profile {
        id: row.get(base)?,
        email: row.get(base + 1)?,
        full_name: row.get(base + 2)?,
        university: row.get(base + 3)?,
        verification_status: row.get(base + 4)?,
        rating: row.get(base + 5)?,
        total_reviews: row.get(base + 6)?,
        created_at: row.get(base + 7)?,
        updated_at: row.get(base + 8)?,
    })
}

pub(crate) const PROFILE_COLS: &str =
    "id, email, full_name, university, verification_status, rating, total_reviews, created_at, updated_at";

pub fn get_profile(conn: &Connection, id: &str) -> Result<Option<Profile>, ServerError> {
    conn.query_row(
        &format!("select {PROFILE_COLS} from profiles where id = ?"),
        params![id],
        row_to_profile,
    )
    .optional()
    .map_err(|e| ServerError::DbError(format!("select profile failed: {e}")))
}

pub fn require_profile(conn: &Connection, id: &str) -> Result<Profile, ServerError> {
    get_profile(conn, id)?.ok_or(ServerError::NotFound)
}

/// Lazy profile creation on first authenticated access. The id comes
/// from the external auth identity; the display name falls back to the
/// local part of the email.
pub fn ensure_profile(
    conn: &Connection,
    id: &str,
    email: &str,
    full_name: Option<&str>,
    now: i64,
) -> Result<Profile, ServerError> {
    let email = email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(ServerError::BadRequest("invalid email".into()));
    }

    let fallback = email.split('@').next().unwrap_or("student");
    let name = match full_name {
        Some(n) if !n.trim().is_empty() => n.trim(),
        _ => fallback,
    };

    conn.execute(
        r#"
        insert or ignore into profiles
          (id, email, full_name, university, verification_status, rating, total_reviews, created_at, updated_at)
        values (?, ?, ?, ?, 'unverified', 0, 0, ?, ?)
        "#,
        params![id, email, name, DEFAULT_UNIVERSITY, now, now],
    )
    .map_err(|e| ServerError::DbError(format!("insert profile failed: {e}")))?;

    require_profile(conn, id)
}

/// Self-service partial update. Only the profile owner reaches this
/// (the route resolves the id from the session).
pub fn update_profile(
    conn: &Connection,
    id: &str,
    update: &ProfileUpdate,
    now: i64,
) -> Result<Profile, ServerError> {
    let current = require_profile(conn, id)?;

    let full_name = update.full_name.as_deref().unwrap_or(&current.full_name);
    let university = update.university.as_deref().unwrap_or(&current.university);

    if full_name.trim().is_empty() {
        return Err(ServerError::BadRequest("full_name must not be empty".into()));
    }

    conn.execute(
        "update profiles set full_name = ?, university = ?, updated_at = ? where id = ?",
        params![full_name, university, now, id],
    )
    .map_err(|e| ServerError::DbError(format!("update profile failed: {e}")))?;

    require_profile(conn, id)
}
