use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::models::NewListing;

/// Table holding pending and completed listing-fee payments
pub const CHECKOUT_SESSIONS_TABLE: &str = "checkout_sessions";

/// State of the hosted checkout page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckoutStatus {
    /// The payer can still complete the payment
    Open,

    /// The checkout finished
    Complete,

    /// The session timed out before payment
    Expired,

    /// A status this client does not know about
    #[serde(other)]
    Unknown,
}

/// State of the payment inside a checkout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// No final answer yet
    Processing,

    /// The payer backed out
    Cancelled,

    /// Money received
    Succeeded,

    /// A status this client does not know about
    #[serde(other)]
    Unknown,
}

/// Local mirror of a provider checkout session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutSession {
    /// Local id, also carried in the return URLs
    pub id: String,
    pub user_id: String,
    pub provider_session_id: String,
    pub amount: i64,
    pub currency: String,
    pub checkout_status: CheckoutStatus,
    pub payment_status: PaymentStatus,
    pub launch_url: String,
    /// The listing row waiting for payment, as JSON
    pub listing_data: serde_json::Value,
    /// Set once the listing has been inserted
    pub listing_id: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl CheckoutSession {
    /// Decode the staged listing payload
    pub fn staged_listing(&self) -> Result<NewListing, Error> {
        Ok(serde_json::from_value(self.listing_data.clone())?)
    }

    /// Whether the listing for this session was already inserted
    pub fn is_fulfilled(&self) -> bool {
        self.listing_id.is_some()
    }
}

/// Columns written when a paid session has produced its listing
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutCompletion {
    pub checkout_status: CheckoutStatus,
    pub payment_status: PaymentStatus,
    pub listing_id: String,
    pub completed_at: DateTime<Utc>,
}

/// Columns written when the provider reports a final non-success state
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutStatusUpdate {
    pub checkout_status: CheckoutStatus,
    pub payment_status: PaymentStatus,
}
