// src/domain/booking.rs
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::profile::Profile;
use crate::domain::space::Space;
use crate::errors::ServerError;

/// Lifecycle of a booking.
///
/// `pending` is the initial state; `cancelled` and `completed` are
/// terminal. Only `confirmed` bookings block competing requests for
/// the same dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Result<Self, ServerError> {
        match s {
            "pending" => Ok(BookingStatus::Pending),
            "confirmed" => Ok(BookingStatus::Confirmed),
            "cancelled" => Ok(BookingStatus::Cancelled),
            "completed" => Ok(BookingStatus::Completed),
            other => Err(ServerError::BadRequest(format!(
                "unknown booking status: {other}"
            ))),
        }
    }

    /// The full transition table. Everything not listed here is rejected,
    /// which makes the two terminal states immutable.
    pub fn can_transition_to(self, next: BookingStatus) -> bool {
        use BookingStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed) | (Pending, Cancelled) | (Confirmed, Cancelled) | (Confirmed, Completed)
        )
    }

    pub fn is_cancellable(self) -> bool {
        matches!(self, BookingStatus::Pending | BookingStatus::Confirmed)
    }

    pub fn is_active(self) -> bool {
        matches!(self, BookingStatus::Confirmed)
    }
}

/// Who is allowed to drive a given transition. Confirming and completing
/// are host actions; cancelling is open to either side of the booking.
pub fn transition_allowed_for(next: BookingStatus, is_host: bool, is_renter: bool) -> bool {
    match next {
        BookingStatus::Confirmed | BookingStatus::Completed => is_host,
        BookingStatus::Cancelled => is_host || is_renter,
        BookingStatus::Pending => false,
    }
}

/// A renter's claim on a space for a date window. Never physically
/// deleted; the status column carries the whole lifecycle.
#[derive(Debug, Clone, Serialize)]
pub struct Booking {
    pub id: String,
    pub space_id: String,
    pub renter_id: String,
    pub host_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_price_cents: i64,
    pub status: BookingStatus,
    pub special_requests: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Booking plus the joined records every booking view needs.
#[derive(Debug, Clone, Serialize)]
pub struct BookingWithContext {
    #[serde(flatten)]
    pub booking: Booking,
    pub space: Space,
    pub renter: Profile,
    pub host: Profile,
}

/// Payload for requesting a booking. The renter is the authenticated
/// actor, the host is denormalized from the space at insert time.
#[derive(Debug, Deserialize)]
pub struct NewBooking {
    pub space_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub special_requests: Option<String>,
}
