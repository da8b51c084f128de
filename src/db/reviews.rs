// src/db/reviews.rs
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::auth::token::new_record_id;
use crate::db::{bookings, profiles};
use crate::domain::booking::BookingStatus;
use crate::domain::review::{NewReview, Review, ReviewType, ReviewWithReviewer};
use crate::errors::ServerError;

const REVIEW_COLS: &str =
    "id, booking_id, reviewer_id, reviewee_id, space_id, rating, comment, review_type, created_at";

struct ReviewRow {
    id: String,
    booking_id: String,
    reviewer_id: String,
    reviewee_id: String,
    space_id: String,
    rating: i64,
    comment: Option<String>,
    review_type: String,
    created_at: i64,
}

fn row_to_review_row(row: &Row<'_>) -> rusqlite::Result<ReviewRow> {
    Ok(ReviewRow {
        id: row.get(0)?,
        booking_id: row.get(1)?,
        reviewer_id: row.get(2)?,
        reviewee_id: row.get(3)?,
        space_id: row.get(4)?,
        rating: row.get(5)?,
        comment: row.get(6)?,
        review_type: row.get(7)?,
        created_at: row.get(8)?,
    })
}

impl ReviewRow {
    fn into_review(self) -> Result<Review, ServerError> {
        let review_type = ReviewType::parse(&self.review_type)
            .map_err(|_| ServerError::DbError(format!("bad review_type in row {}", self.id)))?;
        Ok(Review {
            id: self.id,
            booking_id: self.booking_id,
            reviewer_id: self.reviewer_id,
            reviewee_id: self.reviewee_id,
            space_id: self.space_id,
            rating: self.rating,
            comment: self.comment,
            review_type,
            created_at: self.created_at,
        })
    }
}

/// Record a review of a completed booking. The direction decides who
/// must be writing: the renter authors the host_review, the host
/// authors the renter_review. One review per booking per direction.
pub fn create_review(
    conn: &Connection,
    actor: &str,
    new: &NewReview,
    now: i64,
) -> Result<Review, ServerError> {
    new.validate()?;

    let booking = bookings::get_booking(conn, &new.booking_id)?.booking;

    if booking.status != BookingStatus::Completed {
        return Err(ServerError::BadRequest(
            "reviews are only allowed on completed bookings".into(),
        ));
    }

    let (expected_reviewer, reviewee) = match new.review_type {
        ReviewType::HostReview => (booking.renter_id.as_str(), booking.host_id.as_str()),
        ReviewType::RenterReview => (booking.host_id.as_str(), booking.renter_id.as_str()),
    };
    if actor != expected_reviewer {
        return Err(ServerError::Unauthorized(format!(
            "a {} must be written by the other side of the booking",
            new.review_type.as_str()
        )));
    }

    let exists: Option<String> = conn
        .query_row(
            "select id from reviews where booking_id = ? and review_type = ?",
            params![new.booking_id, new.review_type.as_str()],
            |r| r.get(0),
        )
        .optional()
        .map_err(|e| ServerError::DbError(format!("review lookup failed: {e}")))?;
    if exists.is_some() {
        return Err(ServerError::BadRequest(
            "this booking already has a review in that direction".into(),
        ));
    }

    let id = new_record_id("rv");
    // The unique index on (booking_id, review_type) backstops the
    // check above.
    conn.execute(
        r#"
        insert into reviews (id, booking_id, reviewer_id, reviewee_id, space_id,
                             rating, comment, review_type, created_at)
        values (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
        params![
            id,
            new.booking_id,
            actor,
            reviewee,
            booking.space_id,
            new.rating,
            new.comment,
            new.review_type.as_str(),
            now,
        ],
    )
    .map_err(|e| ServerError::DbError(format!("insert review failed: {e}")))?;

    conn.query_row(
        &format!("select {REVIEW_COLS} from reviews where id = ?"),
        params![id],
        row_to_review_row,
    )
    .map_err(|e| ServerError::DbError(format!("select review failed: {e}")))?
    .into_review()
}

/// Reviews visible on a listing page, newest first, reviewer joined.
pub fn reviews_for_space(
    conn: &Connection,
    space_id: &str,
) -> Result<Vec<ReviewWithReviewer>, ServerError> {
    let profile_cols: String = profiles::PROFILE_COLS
        .split(", ")
        .map(|c| format!("p.{c}"))
        .collect::<Vec<_>>()
        .join(", ");

    let sql = format!(
        "select r.id, r.booking_id, r.reviewer_id, r.reviewee_id, r.space_id,
                r.rating, r.comment, r.review_type, r.created_at, {profile_cols}
         from reviews r
         join profiles p on p.id = r.reviewer_id
         where r.space_id = ?
         order by r.created_at desc, r.id desc"
    );

    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| ServerError::DbError(e.to_string()))?;

    let rows = stmt
        .query_map(params![space_id], |row| {
            Ok((row_to_review_row(row)?, profiles::row_to_profile_at(row, 9)?))
        })
        .map_err(|e| ServerError::DbError(e.to_string()))?;

    let mut out = Vec::new();
    for r in rows {
        let (raw, reviewer) = r.map_err(|e| ServerError::DbError(e.to_string()))?;
        out.push(ReviewWithReviewer {
            review: raw.into_review()?,
            reviewer,
        });
    }
    Ok(out)
}
