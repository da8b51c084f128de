// src/domain/pricing.rs
use chrono::NaiveDate;
use serde::Serialize;

use crate::errors::ServerError;

/// Billing treats a month as 30 days, and any started month bills in
/// full. This is the marketplace's pricing policy, not calendar math.
pub const BILLING_MONTH_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Quote {
    pub days: i64,
    pub months: i64,
    pub total_cents: i64,
}

/// Price a stay: whole calendar days between the dates, rounded up to
/// whole 30-day months, times the monthly rate.
pub fn quote(rate_cents: i64, start: NaiveDate, end: NaiveDate) -> Result<Quote, ServerError> {
    let days = (end - start).num_days();
    if days <= 0 {
        return Err(ServerError::InvalidRange(
            "end date must be after start date".into(),
        ));
    }

    let months = (days + BILLING_MONTH_DAYS - 1) / BILLING_MONTH_DAYS;

    Ok(Quote {
        days,
        months,
        total_cents: months * rate_cents,
    })
}
