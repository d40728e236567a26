use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::i18n::MessageKey;

/// Table holding seller reviews; `(reviewer_id, seller_id)` is unique
pub const REVIEWS_TABLE: &str = "seller_reviews";

/// Columns selected for display, with the reviewer's public profile embedded
pub const REVIEW_COLUMNS: &str = "*,reviewer:profiles!reviewer_id(full_name,avatar_url)";

/// Public fields of the reviewer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewAuthor {
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
}

/// A rating left by a buyer on a seller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SellerReview {
    pub id: String,
    pub seller_id: String,
    pub reviewer_id: String,
    pub rating: u8,
    pub comment: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewer: Option<ReviewAuthor>,
}

/// Payload of a new review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewReview {
    pub seller_id: String,
    pub reviewer_id: String,
    pub rating: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl NewReview {
    /// Build a review, rejecting self-reviews and ratings outside 1..=5
    pub fn new(
        reviewer_id: &str,
        seller_id: &str,
        rating: u8,
        comment: Option<&str>,
    ) -> Result<Self, Error> {
        if reviewer_id == seller_id {
            return Err(Error::SelfReview);
        }
        check_rating(rating)?;

        Ok(Self {
            seller_id: seller_id.to_string(),
            reviewer_id: reviewer_id.to_string(),
            rating,
            comment: normalize_comment(comment),
        })
    }
}

/// Fields a reviewer may change on their own review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewUpdate {
    pub rating: u8,
    pub comment: Option<String>,
}

impl ReviewUpdate {
    pub fn new(rating: u8, comment: Option<&str>) -> Result<Self, Error> {
        check_rating(rating)?;
        Ok(Self {
            rating,
            comment: normalize_comment(comment),
        })
    }
}

fn check_rating(rating: u8) -> Result<(), Error> {
    if (1..=5).contains(&rating) {
        Ok(())
    } else {
        Err(Error::Validation(MessageKey::RatingOutOfRange))
    }
}

fn normalize_comment(comment: Option<&str>) -> Option<String> {
    comment
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
}
