// src/domain/space.rs
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::profile::Profile;
use crate::errors::ServerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageType {
    DormRoom,
    Apartment,
    Garage,
    Closet,
    Basement,
    StorageUnit,
}

impl StorageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageType::DormRoom => "dorm_room",
            StorageType::Apartment => "apartment",
            StorageType::Garage => "garage",
            StorageType::Closet => "closet",
            StorageType::Basement => "basement",
            StorageType::StorageUnit => "storage_unit",
        }
    }

    pub fn parse(s: &str) -> Result<Self, ServerError> {
        match s {
            "dorm_room" => Ok(StorageType::DormRoom),
            "apartment" => Ok(StorageType::Apartment),
            "garage" => Ok(StorageType::Garage),
            "closet" => Ok(StorageType::Closet),
            "basement" => Ok(StorageType::Basement),
            "storage_unit" => Ok(StorageType::StorageUnit),
            other => Err(ServerError::BadRequest(format!(
                "unknown storage type: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeCategory {
    Small,
    Medium,
    Large,
    ExtraLarge,
}

impl SizeCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            SizeCategory::Small => "small",
            SizeCategory::Medium => "medium",
            SizeCategory::Large => "large",
            SizeCategory::ExtraLarge => "extra_large",
        }
    }

    pub fn parse(s: &str) -> Result<Self, ServerError> {
        match s {
            "small" => Ok(SizeCategory::Small),
            "medium" => Ok(SizeCategory::Medium),
            "large" => Ok(SizeCategory::Large),
            "extra_large" => Ok(SizeCategory::ExtraLarge),
            other => Err(ServerError::BadRequest(format!(
                "unknown size category: {other}"
            ))),
        }
    }
}

/// A storage space offered by a host. Soft-deleted via `is_active`,
/// never physically removed.
#[derive(Debug, Clone, Serialize)]
pub struct Space {
    pub id: String,
    pub host_id: String,
    pub title: String,
    pub description: String,
    pub storage_type: StorageType,
    pub size_category: SizeCategory,
    pub price_per_month_cents: i64,
    pub address: String,
    pub campus_area: Option<String>,
    pub available_from: NaiveDate,
    pub available_until: NaiveDate,
    pub amenities: Vec<String>,
    pub images: Vec<String>,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Space plus its owning host profile (the join every listing view needs).
#[derive(Debug, Clone, Serialize)]
pub struct SpaceWithHost {
    #[serde(flatten)]
    pub space: Space,
    pub host: Profile,
}

/// Payload for creating a listing.
#[derive(Debug, Deserialize)]
pub struct NewSpace {
    pub title: String,
    pub description: String,
    pub storage_type: StorageType,
    pub size_category: SizeCategory,
    pub price_per_month_cents: i64,
    pub address: String,
    pub campus_area: Option<String>,
    pub available_from: NaiveDate,
    pub available_until: NaiveDate,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
}

impl NewSpace {
    /// Field-level validation, rejected before anything touches the store.
    pub fn validate(&self) -> Result<(), ServerError> {
        if self.title.trim().is_empty() {
            return Err(ServerError::BadRequest("title is required".into()));
        }
        if self.description.trim().is_empty() {
            return Err(ServerError::BadRequest("description is required".into()));
        }
        if self.address.trim().is_empty() {
            return Err(ServerError::BadRequest("address is required".into()));
        }
        if self.price_per_month_cents <= 0 {
            return Err(ServerError::BadRequest(
                "price_per_month_cents must be positive".into(),
            ));
        }
        if self.available_from > self.available_until {
            return Err(ServerError::InvalidRange(
                "available_from must not be after available_until".into(),
            ));
        }
        Ok(())
    }
}

/// Partial listing update; absent fields are left untouched.
#[derive(Debug, Default, Deserialize)]
pub struct SpaceUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub storage_type: Option<StorageType>,
    pub size_category: Option<SizeCategory>,
    pub price_per_month_cents: Option<i64>,
    pub address: Option<String>,
    pub campus_area: Option<String>,
    pub available_from: Option<NaiveDate>,
    pub available_until: Option<NaiveDate>,
    pub amenities: Option<Vec<String>>,
    pub images: Option<Vec<String>>,
}
