// src/db/bookings.rs
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::auth::token::new_record_id;
use crate::db::{profiles, spaces};
use crate::domain::availability::BookingWindow;
use crate::domain::booking::{
    transition_allowed_for, Booking, BookingStatus, BookingWithContext, NewBooking,
};
use crate::domain::pricing;
use crate::errors::ServerError;

const BOOKING_COLS: &str = "id, space_id, renter_id, host_id, start_date, end_date, \
     total_price_cents, status, special_requests, created_at, updated_at";

struct BookingRow {
    id: String,
    space_id: String,
    renter_id: String,
    host_id: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    total_price_cents: i64,
    status: String,
    special_requests: Option<String>,
    created_at: i64,
    updated_at: i64,
}

fn row_to_booking_row(row: &Row<'_>) -> rusqlite::Result<BookingRow> {
    Ok(BookingRow {
        id: row.get(0)?,
        space_id: row.get(1)?,
        renter_id: row.get(2)?,
        host_id: row.get(3)?,
        start_date: row.get(4)?,
        end_date: row.get(5)?,
        total_price_cents: row.get(6)?,
        status: row.get(7)?,
        special_requests: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

impl BookingRow {
    fn into_booking(self) -> Result<Booking, ServerError> {
        let status = BookingStatus::parse(&self.status)
            .map_err(|_| ServerError::DbError(format!("bad status in booking {}", self.id)))?;
        Ok(Booking {
            id: self.id,
            space_id: self.space_id,
            renter_id: self.renter_id,
            host_id: self.host_id,
            start_date: self.start_date,
            end_date: self.end_date,
            total_price_cents: self.total_price_cents,
            status,
            special_requests: self.special_requests,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn booking_row(conn: &Connection, id: &str) -> Result<Option<Booking>, ServerError> {
    let raw = conn
        .query_row(
            &format!("select {BOOKING_COLS} from bookings where id = ?"),
            params![id],
            row_to_booking_row,
        )
        .optional()
        .map_err(|e| ServerError::DbError(format!("select booking failed: {e}")))?;

    raw.map(BookingRow::into_booking).transpose()
}

fn with_context(conn: &Connection, booking: Booking) -> Result<BookingWithContext, ServerError> {
    let space = spaces::get_space_any(conn, &booking.space_id)?.space;
    let renter = profiles::require_profile(conn, &booking.renter_id)?;
    let host = profiles::require_profile(conn, &booking.host_id)?;
    Ok(BookingWithContext {
        booking,
        space,
        renter,
        host,
    })
}

pub fn get_booking(conn: &Connection, id: &str) -> Result<BookingWithContext, ServerError> {
    let booking = booking_row(conn, id)?.ok_or(ServerError::NotFound)?;
    with_context(conn, booking)
}

/// Every confirmed window in the store. The availability resolver does
/// the overlap math; only `confirmed` rows count, by policy.
pub fn confirmed_windows(conn: &Connection) -> Result<Vec<BookingWindow>, ServerError> {
    let mut stmt = conn
        .prepare("select space_id, start_date, end_date from bookings where status = 'confirmed'")
        .map_err(|e| ServerError::DbError(e.to_string()))?;

    let rows = stmt
        .query_map([], |row| {
            Ok(BookingWindow {
                space_id: row.get(0)?,
                start_date: row.get(1)?,
                end_date: row.get(2)?,
            })
        })
        .map_err(|e| ServerError::DbError(e.to_string()))?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r.map_err(|e| ServerError::DbError(e.to_string()))?);
    }
    Ok(out)
}

/// Renter requests a booking. Price is derived here, once, and frozen
/// on the row; the booking starts out `pending`, which reserves nothing.
pub fn create_booking(
    conn: &Connection,
    actor: &str,
    new: &NewBooking,
    now: i64,
) -> Result<BookingWithContext, ServerError> {
    let space = spaces::get_space(conn, &new.space_id)?.space;

    if space.host_id == actor {
        return Err(ServerError::BadRequest(
            "hosts cannot book their own space".into(),
        ));
    }

    // InvalidRange when end <= start.
    let quote = pricing::quote(space.price_per_month_cents, new.start_date, new.end_date)?;

    if new.start_date < space.available_from || new.end_date > space.available_until {
        return Err(ServerError::BadRequest(
            "requested dates fall outside the space's availability window".into(),
        ));
    }

    let id = new_record_id("bk");
    conn.execute(
        r#"
        insert into bookings (
            id, space_id, renter_id, host_id, start_date, end_date,
            total_price_cents, status, special_requests, created_at, updated_at
        ) values (?, ?, ?, ?, ?, ?, ?, 'pending', ?, ?, ?)
        "#,
        params![
            id,
            space.id,
            actor,
            space.host_id,
            new.start_date,
            new.end_date,
            quote.total_cents,
            new.special_requests,
            now,
            now,
        ],
    )
    .map_err(|e| ServerError::DbError(format!("insert booking failed: {e}")))?;

    tracing::info!(booking = %id, space = %space.id, "booking requested");
    get_booking(conn, &id)
}

fn booking_list(
    conn: &Connection,
    where_clause: &str,
    binds: &[&dyn rusqlite::ToSql],
) -> Result<Vec<BookingWithContext>, ServerError> {
    let sql = format!(
        "select {BOOKING_COLS} from bookings where {where_clause} order by created_at desc, id desc"
    );
    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| ServerError::DbError(e.to_string()))?;

    let rows = stmt
        .query_map(binds, row_to_booking_row)
        .map_err(|e| ServerError::DbError(e.to_string()))?;

    let mut out = Vec::new();
    for r in rows {
        let booking = r
            .map_err(|e| ServerError::DbError(e.to_string()))?
            .into_booking()?;
        out.push(with_context(conn, booking)?);
    }
    Ok(out)
}

pub fn bookings_for_renter(
    conn: &Connection,
    renter_id: &str,
) -> Result<Vec<BookingWithContext>, ServerError> {
    booking_list(conn, "renter_id = ?", &[&renter_id])
}

pub fn bookings_for_host(
    conn: &Connection,
    host_id: &str,
) -> Result<Vec<BookingWithContext>, ServerError> {
    booking_list(conn, "host_id = ?", &[&host_id])
}

/// Both sides of the marketplace at once, the "my bookings" view.
pub fn bookings_for_user(
    conn: &Connection,
    user_id: &str,
) -> Result<Vec<BookingWithContext>, ServerError> {
    booking_list(conn, "renter_id = ? or host_id = ?", &[&user_id, &user_id])
}

/// Drive a lifecycle transition. Runs in a transaction: the status is
/// re-read, the transition table and actor role are checked, and for
/// a confirm the confirmed-overlap invariant is re-verified, all
/// before the single update. A rejected transition leaves the row as
/// it was.
pub fn set_booking_status(
    conn: &mut Connection,
    actor: &str,
    id: &str,
    next: BookingStatus,
    now: i64,
) -> Result<BookingWithContext, ServerError> {
    let tx = conn
        .transaction()
        .map_err(|e| ServerError::DbError(format!("begin tx failed: {e}")))?;

    let booking = booking_row(&tx, id)?.ok_or(ServerError::NotFound)?;

    let is_host = booking.host_id == actor;
    let is_renter = booking.renter_id == actor;
    if !is_host && !is_renter {
        return Err(ServerError::Unauthorized(
            "not a party to this booking".into(),
        ));
    }
    if !transition_allowed_for(next, is_host, is_renter) {
        return Err(ServerError::Unauthorized(format!(
            "this actor may not set a booking to {}",
            next.as_str()
        )));
    }
    if !booking.status.can_transition_to(next) {
        return Err(ServerError::BadRequest(format!(
            "cannot move a {} booking to {}",
            booking.status.as_str(),
            next.as_str()
        )));
    }

    // No double-booking: at most one confirmed booking per space-day.
    if next == BookingStatus::Confirmed {
        let conflicts: i64 = tx
            .query_row(
                r#"
                select count(*) from bookings
                where space_id = ?
                  and status = 'confirmed'
                  and id != ?
                  and start_date <= ?
                  and end_date >= ?
                "#,
                params![booking.space_id, booking.id, booking.end_date, booking.start_date],
                |r| r.get(0),
            )
            .map_err(|e| ServerError::DbError(format!("overlap check failed: {e}")))?;
        if conflicts > 0 {
            return Err(ServerError::BadRequest(
                "another confirmed booking already covers these dates".into(),
            ));
        }
    }

    tx.execute(
        "update bookings set status = ?, updated_at = ? where id = ?",
        params![next.as_str(), now, id],
    )
    .map_err(|e| ServerError::DbError(format!("update booking failed: {e}")))?;

    tx.commit()
        .map_err(|e| ServerError::DbError(format!("commit failed: {e}")))?;

    tracing::info!(booking = %id, status = next.as_str(), "booking transitioned");
    get_booking(conn, id)
}
