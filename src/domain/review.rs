// src/domain/review.rs
use serde::{Deserialize, Serialize};

use crate::domain::profile::Profile;
use crate::errors::ServerError;

/// Which direction a review points. A `host_review` is written by the
/// renter about the host; a `renter_review` is written by the host
/// about the renter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewType {
    HostReview,
    RenterReview,
}

impl ReviewType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewType::HostReview => "host_review",
            ReviewType::RenterReview => "renter_review",
        }
    }

    pub fn parse(s: &str) -> Result<Self, ServerError> {
        match s {
            "host_review" => Ok(ReviewType::HostReview),
            "renter_review" => Ok(ReviewType::RenterReview),
            other => Err(ServerError::BadRequest(format!(
                "unknown review type: {other}"
            ))),
        }
    }
}

/// One review of a completed booking. Immutable once written.
#[derive(Debug, Clone, Serialize)]
pub struct Review {
    pub id: String,
    pub booking_id: String,
    pub reviewer_id: String,
    pub reviewee_id: String,
    pub space_id: String,
    pub rating: i64,
    pub comment: Option<String>,
    pub review_type: ReviewType,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReviewWithReviewer {
    #[serde(flatten)]
    pub review: Review,
    pub reviewer: Profile,
}

#[derive(Debug, Deserialize)]
pub struct NewReview {
    pub booking_id: String,
    pub rating: i64,
    pub comment: Option<String>,
    pub review_type: ReviewType,
}

impl NewReview {
    pub fn validate(&self) -> Result<(), ServerError> {
        if !(1..=5).contains(&self.rating) {
            return Err(ServerError::BadRequest(
                "rating must be between 1 and 5".into(),
            ));
        }
        Ok(())
    }
}
