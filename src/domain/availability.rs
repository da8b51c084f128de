// src/domain/availability.rs
use std::collections::HashSet;

use chrono::NaiveDate;

use crate::domain::space::SpaceWithHost;

/// The slice of a confirmed booking the overlap check needs.
#[derive(Debug, Clone)]
pub struct BookingWindow {
    pub space_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Two date windows share at least one day.
pub fn windows_overlap(
    a_start: NaiveDate,
    a_end: NaiveDate,
    b_start: NaiveDate,
    b_end: NaiveDate,
) -> bool {
    a_start <= b_end && a_end >= b_start
}

/// Drop spaces that have a confirmed booking overlapping the requested
/// window. Pending, cancelled, and completed bookings never block, so
/// callers must pass confirmed windows only.
///
/// A no-op pass-through unless both dates are supplied. Collect-then-filter
/// is O(spaces + bookings); fine at campus-catalog scale.
pub fn retain_available(
    spaces: Vec<SpaceWithHost>,
    confirmed: &[BookingWindow],
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Vec<SpaceWithHost> {
    let (Some(start), Some(end)) = (start, end) else {
        return spaces;
    };

    let blocked: HashSet<&str> = confirmed
        .iter()
        .filter(|w| windows_overlap(w.start_date, w.end_date, start, end))
        .map(|w| w.space_id.as_str())
        .collect();

    spaces
        .into_iter()
        .filter(|s| !blocked.contains(s.space.id.as_str()))
        .collect()
}
