//! What the payment return page shows

use serde::{Deserialize, Serialize};

use crate::i18n::{Locale, MessageKey};
use crate::models::{CheckoutStatus, PaymentStatus};

use super::ProviderSession;

/// Decision taken from a provider session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Money received: the listing can be inserted
    Paid,

    /// The payer may still complete the checkout
    Pending,

    /// Final state without payment
    Failed(FailureReason),
}

/// Why a checkout ended without payment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// The hosted page timed out
    Expired,

    /// The payer cancelled
    Cancelled,

    /// Anything else
    Error,
}

impl FailureReason {
    pub fn message_key(&self) -> MessageKey {
        match self {
            FailureReason::Expired => MessageKey::PaymentSessionExpired,
            FailureReason::Cancelled => MessageKey::PaymentCancelled,
            FailureReason::Error => MessageKey::PaymentFailed,
        }
    }
}

/// Classify a provider session
///
/// Payment success wins over everything else; an expired checkout is checked
/// before the payment status so an expired session reports expiry even if
/// the provider also flagged it cancelled.
pub fn verdict(session: &ProviderSession) -> Verdict {
    match (&session.checkout_status, &session.payment_status) {
        (_, PaymentStatus::Succeeded) => Verdict::Paid,
        (CheckoutStatus::Expired, _) => Verdict::Failed(FailureReason::Expired),
        (_, PaymentStatus::Cancelled) => Verdict::Failed(FailureReason::Cancelled),
        (CheckoutStatus::Open, PaymentStatus::Processing) => Verdict::Pending,
        _ => Verdict::Failed(FailureReason::Error),
    }
}

/// State behind the payment error page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentError {
    pub reason: FailureReason,
    pub message_key: MessageKey,
    /// Whether the page offers to start a new payment
    pub can_retry: bool,
}

impl PaymentError {
    pub fn new(reason: FailureReason) -> Self {
        Self {
            reason,
            message_key: reason.message_key(),
            can_retry: true,
        }
    }

    /// The translated message
    pub fn message(&self, locale: Locale) -> &'static str {
        self.message_key.text(locale)
    }
}

/// Result of confirming a checkout session on return
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentOutcome {
    /// The listing is live
    Published {
        /// Id of the inserted listing
        listing_id: String,
    },

    /// No final answer yet; the page may poll again
    Pending,

    /// The payment did not go through
    Failed(PaymentError),
}

impl PaymentOutcome {
    pub fn message_key(&self) -> MessageKey {
        match self {
            PaymentOutcome::Published { .. } => MessageKey::PaymentSuccess,
            PaymentOutcome::Pending => MessageKey::PaymentPending,
            PaymentOutcome::Failed(error) => error.message_key,
        }
    }

    pub fn message(&self, locale: Locale) -> &'static str {
        self.message_key().text(locale)
    }
}
