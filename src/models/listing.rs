use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::i18n::MessageKey;
use crate::storage::ImageUpload;

/// Table holding the classifieds posts
pub const LISTINGS_TABLE: &str = "listings";

/// Lifecycle of a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingStatus {
    /// Visible in browse results
    #[default]
    Active,

    /// Kept on the seller's page, hidden from browse
    Sold,

    /// Withdrawn by the seller
    Inactive,
}

impl ListingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingStatus::Active => "active",
            ListingStatus::Sold => "sold",
            ListingStatus::Inactive => "inactive",
        }
    }
}

impl fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ListingStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(ListingStatus::Active),
            "sold" => Ok(ListingStatus::Sold),
            "inactive" => Ok(ListingStatus::Inactive),
            other => Err(Error::general(format!("unknown listing status: {}", other))),
        }
    }
}

/// A classifieds post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: String,
    pub price: i64,
    pub currency: String,
    pub location: String,
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    pub images: Vec<String>,
    pub category_id: String,
    pub subcategory_id: Option<String>,
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    pub status: ListingStatus,
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    pub views_count: i64,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Listing {
    /// First photo, used as the card thumbnail
    pub fn cover_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    pub fn is_active(&self) -> bool {
        self.status == ListingStatus::Active
    }
}

/// Row payload inserted once the listing fee is paid
///
/// This is also what gets staged as JSON on the checkout session while the
/// payment is pending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewListing {
    pub user_id: String,
    pub title: String,
    pub description: String,
    pub price: i64,
    pub currency: String,
    pub location: String,
    pub images: Vec<String>,
    pub category_id: String,
    pub subcategory_id: Option<String>,
    pub status: ListingStatus,
}

/// What the publish form collects
#[derive(Debug, Clone, Default)]
pub struct ListingDraft {
    pub title: String,
    pub description: String,
    pub price: Option<i64>,
    pub currency: Option<String>,
    pub location: String,
    pub category_id: String,
    pub subcategory_id: Option<String>,
    pub images: Vec<ImageUpload>,
}

impl ListingDraft {
    /// Field presence checks run before anything is uploaded
    pub fn validate(&self) -> Result<(), Error> {
        if self.title.trim().is_empty() {
            return Err(Error::Validation(MessageKey::TitleRequired));
        }
        if self.description.trim().is_empty() {
            return Err(Error::Validation(MessageKey::DescriptionRequired));
        }
        if !matches!(self.price, Some(p) if p > 0) {
            return Err(Error::Validation(MessageKey::PriceRequired));
        }
        if self.location.trim().is_empty() {
            return Err(Error::Validation(MessageKey::LocationRequired));
        }
        if self.category_id.trim().is_empty() {
            return Err(Error::Validation(MessageKey::CategoryRequired));
        }
        if self.images.is_empty() {
            return Err(Error::Validation(MessageKey::ImagesRequired));
        }
        Ok(())
    }

    /// Row payload for this draft once its photos are stored
    pub fn into_new_listing(
        self,
        user_id: &str,
        image_urls: Vec<String>,
        default_currency: &str,
    ) -> NewListing {
        NewListing {
            user_id: user_id.to_string(),
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            price: self.price.unwrap_or_default(),
            currency: self
                .currency
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| default_currency.to_string()),
            location: self.location.trim().to_string(),
            images: image_urls,
            category_id: self.category_id,
            subcategory_id: self.subcategory_id.filter(|s| !s.is_empty()),
            status: ListingStatus::Active,
        }
    }
}

/// Browse filters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListingFilter {
    pub category_id: Option<String>,
    pub subcategory_id: Option<String>,
    /// Matched against the title
    pub search: Option<String>,
    pub location: Option<String>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> ListingDraft {
        ListingDraft {
            title: " Vélo ".to_string(),
            description: "Bon état".to_string(),
            price: Some(45_000),
            currency: None,
            location: "Dakar".to_string(),
            category_id: "vehicules".to_string(),
            subcategory_id: Some(String::new()),
            images: vec![ImageUpload::new("a.jpg", "image/jpeg", vec![1])],
        }
    }

    #[test]
    fn complete_draft_validates() {
        assert!(draft().validate().is_ok());
    }

    #[test]
    fn missing_images_rejected() {
        let mut d = draft();
        d.images.clear();
        match d.validate() {
            Err(Error::Validation(MessageKey::ImagesRequired)) => {}
            other => panic!("expected ImagesRequired, got {:?}", other),
        }
    }

    #[test]
    fn zero_price_rejected() {
        let mut d = draft();
        d.price = Some(0);
        assert!(matches!(
            d.validate(),
            Err(Error::Validation(MessageKey::PriceRequired))
        ));
    }

    #[test]
    fn new_listing_trims_and_defaults_currency() {
        let row = draft().into_new_listing("u1", vec!["https://x/1.jpg".into()], "XOF");
        assert_eq!(row.title, "Vélo");
        assert_eq!(row.currency, "XOF");
        assert_eq!(row.subcategory_id, None);
        assert_eq!(row.status, ListingStatus::Active);
    }

    #[test]
    fn status_round_trips_through_json() {
        let json = serde_json::to_string(&ListingStatus::Sold).unwrap();
        assert_eq!(json, "\"sold\"");
        assert_eq!("inactive".parse::<ListingStatus>().unwrap(), ListingStatus::Inactive);
    }

    #[test]
    fn null_images_and_counter_read_as_defaults() {
        let listing: Listing = serde_json::from_value(serde_json::json!({
            "id": "lst-1",
            "user_id": "u1",
            "title": "Frigo",
            "description": "Marche bien",
            "price": 60000,
            "currency": "XOF",
            "location": "Dakar",
            "images": null,
            "category_id": "maison",
            "subcategory_id": null,
            "status": null,
            "views_count": null,
            "created_at": null,
            "updated_at": null
        }))
        .unwrap();

        assert!(listing.images.is_empty());
        assert_eq!(listing.cover_image(), None);
        assert_eq!(listing.views_count, 0);
        assert!(listing.is_active());
    }
}
