//! Checkout session objects exchanged with the payment proxy

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::models::{CheckoutStatus, PaymentStatus};

/// Request body of the create-session proxy function
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateCheckoutRequest {
    /// Amount to charge, in whole currency units
    pub amount: i64,

    /// ISO 4217 currency code
    pub currency: String,

    /// Local checkout session id, echoed back by the provider
    pub client_reference: String,

    /// Where the provider redirects after a successful payment
    pub success_url: String,

    /// Where the provider redirects after a failed or abandoned payment
    pub error_url: String,
}

/// Request body of the get-session proxy function
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetCheckoutRequest {
    /// Provider session id
    pub session_id: String,
}

/// Last error the provider recorded for a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderPaymentError {
    pub code: Option<String>,
    pub message: Option<String>,
}

/// Checkout session as reported by the provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderSession {
    /// Provider session id
    pub id: String,

    /// Charged amount; the provider encodes it as a decimal string
    #[serde(deserialize_with = "amount_from_string_or_number")]
    pub amount: i64,

    pub currency: String,

    pub checkout_status: CheckoutStatus,

    pub payment_status: PaymentStatus,

    /// Hosted page to send the payer to
    #[serde(alias = "wave_launch_url")]
    pub launch_url: String,

    pub client_reference: Option<String>,

    pub when_created: Option<DateTime<Utc>>,

    pub when_completed: Option<DateTime<Utc>>,

    pub when_expires: Option<DateTime<Utc>>,

    #[serde(default)]
    pub last_payment_error: Option<ProviderPaymentError>,
}

fn amount_from_string_or_number<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Amount {
        Number(i64),
        Text(String),
    }

    match Amount::deserialize(deserializer)? {
        Amount::Number(n) => Ok(n),
        Amount::Text(s) => {
            let whole = s.trim().split('.').next().unwrap_or("");
            whole.parse::<i64>().map_err(serde::de::Error::custom)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_provider_session_with_string_amount() {
        let session: ProviderSession = serde_json::from_value(json!({
            "id": "cos-18qq25rgr100a",
            "amount": "1000",
            "currency": "XOF",
            "checkout_status": "open",
            "payment_status": "processing",
            "wave_launch_url": "https://pay.wave.com/c/cos-18qq25rgr100a",
            "client_reference": "local-1",
            "when_created": "2026-03-12T10:00:00Z",
            "when_expires": "2026-03-12T10:30:00Z"
        }))
        .unwrap();

        assert_eq!(session.amount, 1000);
        assert_eq!(session.checkout_status, CheckoutStatus::Open);
        assert_eq!(session.launch_url, "https://pay.wave.com/c/cos-18qq25rgr100a");
        assert!(session.when_completed.is_none());
    }

    #[test]
    fn decimal_amount_keeps_whole_part() {
        let session: ProviderSession = serde_json::from_value(json!({
            "id": "x", "amount": "2500.00", "currency": "XOF",
            "checkout_status": "complete", "payment_status": "succeeded",
            "launch_url": "https://pay/x"
        }))
        .unwrap();
        assert_eq!(session.amount, 2500);
    }
}
