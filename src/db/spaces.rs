// src/db/spaces.rs
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::auth::token::new_record_id;
use crate::db::{bookings, profiles};
use crate::domain::availability;
use crate::domain::filters::{self, SearchFilters};
use crate::domain::paging::{self, Page};
use crate::domain::space::{NewSpace, SizeCategory, Space, SpaceUpdate, SpaceWithHost, StorageType};
use crate::errors::ServerError;

const SPACE_COLS: &str = "s.id, s.host_id, s.title, s.description, s.storage_type, s.size_category, \
     s.price_per_month_cents, s.address, s.campus_area, s.available_from, s.available_until, \
     s.amenities, s.images, s.is_active, s.created_at, s.updated_at";

/// Raw row as stored; enums and JSON arrays still as text.
struct SpaceRow {
    id: String,
    host_id: String,
    title: String,
    description: String,
    storage_type: String,
    size_category: String,
    price_per_month_cents: i64,
    address: String,
    campus_area: Option<String>,
    available_from: NaiveDate,
    available_until: NaiveDate,
    amenities: String,
    images: String,
    is_active: bool,
    created_at: i64,
    updated_at: i64,
}

fn row_to_space_row(row: &Row<'_>) -> rusqlite::Result<SpaceRow> {
    Ok(SpaceRow {
        id: row.get(0)?,
        host_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        storage_type: row.get(4)?,
        size_category: row.get(5)?,
        price_per_month_cents: row.get(6)?,
        address: row.get(7)?,
        campus_area: row.get(8)?,
        available_from: row.get(9)?,
        available_until: row.get(10)?,
        amenities: row.get(11)?,
        images: row.get(12)?,
        is_active: row.get(13)?,
        created_at: row.get(14)?,
        updated_at: row.get(15)?,
    })
}

impl SpaceRow {
    fn into_space(self) -> Result<Space, ServerError> {
        let storage_type = StorageType::parse(&self.storage_type)
            .map_err(|_| ServerError::DbError(format!("bad storage_type in row {}", self.id)))?;
        let size_category = SizeCategory::parse(&self.size_category)
            .map_err(|_| ServerError::DbError(format!("bad size_category in row {}", self.id)))?;
        let amenities: Vec<String> = serde_json::from_str(&self.amenities)
            .map_err(|e| ServerError::DbError(format!("bad amenities json: {e}")))?;
        let images: Vec<String> = serde_json::from_str(&self.images)
            .map_err(|e| ServerError::DbError(format!("bad images json: {e}")))?;

        Ok(Space {
            id: self.id,
            host_id: self.host_id,
            title: self.title,
            description: self.description,
            storage_type,
            size_category,
            price_per_month_cents: self.price_per_month_cents,
            address: self.address,
            campus_area: self.campus_area,
            available_from: self.available_from,
            available_until: self.available_until,
            amenities,
            images,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn fetch_space_with_host(
    conn: &Connection,
    id: &str,
    require_active: bool,
) -> Result<Option<SpaceWithHost>, ServerError> {
    let active_clause = if require_active { "and s.is_active = 1" } else { "" };
    let sql = format!(
        "select {SPACE_COLS}, {profile_cols}
         from spaces s
         join profiles p on p.id = s.host_id
         where s.id = ? {active_clause}",
        profile_cols = prefixed_profile_cols(),
    );

    let raw = conn
        .query_row(&sql, params![id], |row| {
            Ok((row_to_space_row(row)?, profiles::row_to_profile_at(row, 16)?))
        })
        .optional()
        .map_err(|e| ServerError::DbError(format!("select space failed: {e}")))?;

    match raw {
        Some((row, host)) => Ok(Some(SpaceWithHost {
            space: row.into_space()?,
            host,
        })),
        None => Ok(None),
    }
}

fn prefixed_profile_cols() -> String {
    profiles::PROFILE_COLS
        .split(", ")
        .map(|c| format!("p.{c}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Active listing by id, host joined. NotFound covers both a missing
/// row and a soft-deleted one.
pub fn get_space(conn: &Connection, id: &str) -> Result<SpaceWithHost, ServerError> {
    fetch_space_with_host(conn, id, true)?.ok_or(ServerError::NotFound)
}

/// Listing regardless of the active flag. Booking views still need a
/// space after its host has delisted it.
pub(crate) fn get_space_any(conn: &Connection, id: &str) -> Result<SpaceWithHost, ServerError> {
    fetch_space_with_host(conn, id, false)?.ok_or(ServerError::NotFound)
}

/// All active listings, newest first. These are the search candidates.
pub fn list_active_spaces(conn: &Connection) -> Result<Vec<SpaceWithHost>, ServerError> {
    let sql = format!(
        "select {SPACE_COLS}, {profile_cols}
         from spaces s
         join profiles p on p.id = s.host_id
         where s.is_active = 1
         order by s.created_at desc, s.id desc",
        profile_cols = prefixed_profile_cols(),
    );

    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| ServerError::DbError(e.to_string()))?;

    let rows = stmt
        .query_map([], |row| {
            Ok((row_to_space_row(row)?, profiles::row_to_profile_at(row, 16)?))
        })
        .map_err(|e| ServerError::DbError(e.to_string()))?;

    let mut out = Vec::new();
    for r in rows {
        let (row, host) = r.map_err(|e| ServerError::DbError(e.to_string()))?;
        out.push(SpaceWithHost {
            space: row.into_space()?,
            host,
        });
    }
    Ok(out)
}

/// Active listings owned by one host, newest first.
pub fn spaces_by_host(conn: &Connection, host_id: &str) -> Result<Vec<SpaceWithHost>, ServerError> {
    let sql = format!(
        "select {SPACE_COLS}, {profile_cols}
         from spaces s
         join profiles p on p.id = s.host_id
         where s.host_id = ? and s.is_active = 1
         order by s.created_at desc, s.id desc",
        profile_cols = prefixed_profile_cols(),
    );

    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| ServerError::DbError(e.to_string()))?;

    let rows = stmt
        .query_map(params![host_id], |row| {
            Ok((row_to_space_row(row)?, profiles::row_to_profile_at(row, 16)?))
        })
        .map_err(|e| ServerError::DbError(e.to_string()))?;

    let mut out = Vec::new();
    for r in rows {
        let (row, host) = r.map_err(|e| ServerError::DbError(e.to_string()))?;
        out.push(SpaceWithHost {
            space: row.into_space()?,
            host,
        });
    }
    Ok(out)
}

/// Insert-returning create. The actor becomes the host; `is_active`
/// is forced on.
pub fn create_space(
    conn: &Connection,
    actor: &str,
    new: &NewSpace,
    now: i64,
) -> Result<SpaceWithHost, ServerError> {
    new.validate()?;

    let id = new_record_id("sp");
    let amenities = serde_json::to_string(&new.amenities)
        .map_err(|e| ServerError::DbError(format!("encode amenities failed: {e}")))?;
    let images = serde_json::to_string(&new.images)
        .map_err(|e| ServerError::DbError(format!("encode images failed: {e}")))?;

    conn.execute(
        r#"
        insert into spaces (
            id, host_id, title, description, storage_type, size_category,
            price_per_month_cents, address, campus_area,
            available_from, available_until, amenities, images,
            is_active, created_at, updated_at
        ) values (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 1, ?, ?)
        "#,
        params![
            id,
            actor,
            new.title.trim(),
            new.description.trim(),
            new.storage_type.as_str(),
            new.size_category.as_str(),
            new.price_per_month_cents,
            new.address.trim(),
            new.campus_area,
            new.available_from,
            new.available_until,
            amenities,
            images,
            now,
            now,
        ],
    )
    .map_err(|e| ServerError::DbError(format!("insert space failed: {e}")))?;

    get_space(conn, &id)
}

/// Partial update-returning. Only the owning host may mutate; the
/// check sits next to the write, not in some outer policy layer.
pub fn update_space(
    conn: &Connection,
    actor: &str,
    id: &str,
    update: &SpaceUpdate,
    now: i64,
) -> Result<SpaceWithHost, ServerError> {
    let current = fetch_space_with_host(conn, id, false)?
        .ok_or(ServerError::NotFound)?
        .space;

    if current.host_id != actor {
        return Err(ServerError::Unauthorized(
            "only the host may modify this space".into(),
        ));
    }

    let title = update.title.as_deref().unwrap_or(&current.title);
    let description = update.description.as_deref().unwrap_or(&current.description);
    let storage_type = update.storage_type.unwrap_or(current.storage_type);
    let size_category = update.size_category.unwrap_or(current.size_category);
    let price = update
        .price_per_month_cents
        .unwrap_or(current.price_per_month_cents);
    let address = update.address.as_deref().unwrap_or(&current.address);
    let campus_area = update
        .campus_area
        .as_deref()
        .or(current.campus_area.as_deref());
    let available_from = update.available_from.unwrap_or(current.available_from);
    let available_until = update.available_until.unwrap_or(current.available_until);
    let amenities = update.amenities.as_ref().unwrap_or(&current.amenities);
    let images = update.images.as_ref().unwrap_or(&current.images);

    if title.trim().is_empty() {
        return Err(ServerError::BadRequest("title must not be empty".into()));
    }
    if price <= 0 {
        return Err(ServerError::BadRequest(
            "price_per_month_cents must be positive".into(),
        ));
    }
    if available_from > available_until {
        return Err(ServerError::InvalidRange(
            "available_from must not be after available_until".into(),
        ));
    }

    let amenities_json = serde_json::to_string(amenities)
        .map_err(|e| ServerError::DbError(format!("encode amenities failed: {e}")))?;
    let images_json = serde_json::to_string(images)
        .map_err(|e| ServerError::DbError(format!("encode images failed: {e}")))?;

    conn.execute(
        r#"
        update spaces set
            title = ?, description = ?, storage_type = ?, size_category = ?,
            price_per_month_cents = ?, address = ?, campus_area = ?,
            available_from = ?, available_until = ?, amenities = ?, images = ?,
            updated_at = ?
        where id = ?
        "#,
        params![
            title.trim(),
            description.trim(),
            storage_type.as_str(),
            size_category.as_str(),
            price,
            address.trim(),
            campus_area,
            available_from,
            available_until,
            amenities_json,
            images_json,
            now,
            id,
        ],
    )
    .map_err(|e| ServerError::DbError(format!("update space failed: {e}")))?;

    fetch_space_with_host(conn, id, false)?.ok_or(ServerError::NotFound)
}

/// Logical delete: flip `is_active` off. The row (and its booking
/// history) stays.
pub fn deactivate_space(
    conn: &Connection,
    actor: &str,
    id: &str,
    now: i64,
) -> Result<(), ServerError> {
    let current = fetch_space_with_host(conn, id, false)?
        .ok_or(ServerError::NotFound)?
        .space;

    if current.host_id != actor {
        return Err(ServerError::Unauthorized(
            "only the host may delete this space".into(),
        ));
    }

    conn.execute(
        "update spaces set is_active = 0, updated_at = ? where id = ?",
        params![now, id],
    )
    .map_err(|e| ServerError::DbError(format!("deactivate space failed: {e}")))?;

    Ok(())
}

/// The search pipeline: load active candidates, apply the filter
/// predicates, drop spaces with conflicting confirmed bookings, then
/// slice one page.
pub fn search_spaces(
    conn: &Connection,
    f: &SearchFilters,
    page_no: usize,
    page_size: usize,
) -> Result<Page<SpaceWithHost>, ServerError> {
    let candidates = list_active_spaces(conn)?;

    let mut kept: Vec<SpaceWithHost> = candidates
        .into_iter()
        .filter(|s| filters::matches(&s.space, f))
        .collect();

    if f.has_date_window() {
        let confirmed = bookings::confirmed_windows(conn)?;
        kept = availability::retain_available(kept, &confirmed, f.start_date, f.end_date);
    }

    Ok(paging::page(kept, page_no, page_size))
}
