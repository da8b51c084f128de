// src/domain/filters.rs
use chrono::NaiveDate;
use serde::Deserialize;

use crate::domain::space::{SizeCategory, Space, StorageType};

/// Search criteria. Every field is optional: an absent field imposes
/// no constraint, present fields are ANDed together.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct SearchFilters {
    pub storage_type: Option<StorageType>,
    pub size_category: Option<SizeCategory>,
    pub min_price_cents: Option<i64>,
    pub max_price_cents: Option<i64>,
    pub campus_area: Option<String>,
    #[serde(default)]
    pub amenities: Vec<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl SearchFilters {
    pub fn has_date_window(&self) -> bool {
        self.start_date.is_some() && self.end_date.is_some()
    }
}

/// Pure predicate: does `space` satisfy every present criterion?
pub fn matches(space: &Space, f: &SearchFilters) -> bool {
    if let Some(t) = f.storage_type {
        if space.storage_type != t {
            return false;
        }
    }

    if let Some(s) = f.size_category {
        if space.size_category != s {
            return false;
        }
    }

    // Inclusive price range.
    if let Some(min) = f.min_price_cents {
        if space.price_per_month_cents < min {
            return false;
        }
    }
    if let Some(max) = f.max_price_cents {
        if space.price_per_month_cents > max {
            return false;
        }
    }

    // Case-insensitive substring on the campus area text.
    if let Some(area) = f.campus_area.as_deref() {
        let needle = area.to_lowercase();
        let hit = space
            .campus_area
            .as_deref()
            .map(|a| a.to_lowercase().contains(&needle))
            .unwrap_or(false);
        if !hit {
            return false;
        }
    }

    // Non-empty intersection on amenity tags.
    if !f.amenities.is_empty() {
        let any = f.amenities.iter().any(|a| space.amenities.contains(a));
        if !any {
            return false;
        }
    }

    // Availability containment: the listing's window must cover each
    // requested bound that is present.
    if let Some(start) = f.start_date {
        if space.available_from > start {
            return false;
        }
    }
    if let Some(end) = f.end_date {
        if space.available_until < end {
            return false;
        }
    }

    true
}
