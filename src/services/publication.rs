//! Publishing a listing behind the listing-fee checkout
//!
//! [`PublicationService::start`] stores the photos, opens a checkout session
//! with the payment provider and stages the listing on a local
//! `checkout_sessions` row. The provider then sends the payer back to
//! `/payment/success` or `/payment/error` with `session_id=<local id>`, where
//! [`PublicationService::confirm`] asks the provider for the final state and
//! inserts the listing once the fee is paid.

use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use serde::Serialize;
use std::sync::Arc;
use url::Url;
use uuid::Uuid;

use crate::error::Error;
use crate::i18n::MessageKey;
use crate::models::{
    CheckoutCompletion, CheckoutSession, CheckoutStatus, CheckoutStatusUpdate, Listing,
    ListingDraft, PaymentStatus, CHECKOUT_SESSIONS_TABLE, LISTINGS_TABLE,
};
use crate::payment::{
    verdict, CreateCheckoutRequest, PaymentError, PaymentOutcome, PaymentProvider, Verdict,
};
use crate::postgrest::Filterable;
use crate::storage::{FileOptions, ImageUpload};
use crate::Grabi;

/// Query parameter carrying the local session id on the return URLs
pub const SESSION_ID_PARAM: &str = "session_id";

/// Where to send the payer once the checkout session exists
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartedCheckout {
    /// Local checkout session id
    pub session_id: String,

    /// Provider-hosted payment page
    pub launch_url: String,
}

#[derive(Serialize)]
struct NewCheckoutRow<'a> {
    id: &'a str,
    user_id: &'a str,
    provider_session_id: &'a str,
    amount: i64,
    currency: &'a str,
    checkout_status: &'a CheckoutStatus,
    payment_status: &'a PaymentStatus,
    launch_url: &'a str,
    listing_data: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    expires_at: Option<DateTime<Utc>>,
}

/// The publish form's backend
pub struct PublicationService {
    grabi: Grabi,
    provider: Arc<dyn PaymentProvider>,
}

impl PublicationService {
    pub(crate) fn new(grabi: Grabi, provider: Arc<dyn PaymentProvider>) -> Self {
        Self { grabi, provider }
    }

    /// Success and error return URLs for a local session id
    pub fn return_urls(&self, session_id: &str) -> (String, String) {
        let site = self.grabi.options.site_url.trim_end_matches('/');
        (
            format!("{}/payment/success?{}={}", site, SESSION_ID_PARAM, session_id),
            format!("{}/payment/error?{}={}", site, SESSION_ID_PARAM, session_id),
        )
    }

    /// Validate the draft, store its photos and open the fee checkout
    pub async fn start(&self, draft: ListingDraft) -> Result<StartedCheckout, Error> {
        let auth = self.grabi.auth();
        let user_id = auth.user_id()?;
        let token = auth.access_token()?;
        draft.validate()?;

        let mut draft = draft;
        let images = std::mem::take(&mut draft.images);
        let (image_paths, image_urls) = self.upload_images(&user_id, images).await?;

        let session_id = Uuid::new_v4().to_string();
        let (success_url, error_url) = self.return_urls(&session_id);
        let request = CreateCheckoutRequest {
            amount: self.grabi.options.listing_fee,
            currency: self.grabi.options.fee_currency.clone(),
            client_reference: session_id.clone(),
            success_url,
            error_url,
        };

        let provider_session = match self.provider.create_session(&request, &token).await {
            Ok(session) => session,
            Err(e) => {
                self.discard_images(&image_paths).await;
                return Err(e);
            }
        };

        let listing = draft.into_new_listing(&user_id, image_urls, &self.grabi.options.fee_currency);
        let row = NewCheckoutRow {
            id: &session_id,
            user_id: &user_id,
            provider_session_id: &provider_session.id,
            amount: request.amount,
            currency: &request.currency,
            checkout_status: &provider_session.checkout_status,
            payment_status: &provider_session.payment_status,
            launch_url: &provider_session.launch_url,
            listing_data: serde_json::to_value(&listing)?,
            expires_at: provider_session.when_expires,
        };

        self.grabi
            .from(CHECKOUT_SESSIONS_TABLE)
            .insert(&row)
            .execute_no_return()
            .await?;

        info!(
            "checkout session {} opened for user {} (provider {})",
            session_id, user_id, provider_session.id
        );

        Ok(StartedCheckout {
            session_id,
            launch_url: provider_session.launch_url,
        })
    }

    /// Upload every photo, returning the object paths and public URLs
    async fn upload_images(
        &self,
        user_id: &str,
        images: Vec<ImageUpload>,
    ) -> Result<(Vec<String>, Vec<String>), Error> {
        let storage = self.grabi.storage();
        let bucket = storage.from(&self.grabi.options.buckets.listing_images);

        let mut paths = Vec::with_capacity(images.len());
        let mut urls = Vec::with_capacity(images.len());
        for image in images {
            let path = format!("{}/{}.{}", user_id, Uuid::new_v4(), image.extension());
            let options = FileOptions::default().with_content_type(&image.content_type);
            if let Err(e) = bucket.upload(&path, image.data, options).await {
                self.discard_images(&paths).await;
                return Err(e);
            }
            urls.push(bucket.get_public_url(&path));
            paths.push(path);
        }

        debug!("uploaded {} listing images for {}", paths.len(), user_id);
        Ok((paths, urls))
    }

    async fn discard_images(&self, paths: &[String]) {
        if paths.is_empty() {
            return;
        }
        let storage = self.grabi.storage();
        let bucket = storage.from(&self.grabi.options.buckets.listing_images);
        if let Err(e) = bucket.remove(paths).await {
            warn!("could not remove {} orphan listing images: {}", paths.len(), e);
        }
    }

    /// Fetch a local checkout session row
    pub async fn session(&self, session_id: &str) -> Result<CheckoutSession, Error> {
        self.grabi
            .from(CHECKOUT_SESSIONS_TABLE)
            .select("*")
            .eq("id", session_id)
            .execute_one::<CheckoutSession>()
            .await?
            .ok_or(Error::Validation(MessageKey::PaymentSessionNotFound))
    }

    /// Settle a checkout session on the return page
    ///
    /// Safe to call more than once: a session that already produced its
    /// listing answers with that listing. If the provider reports a payment
    /// but the listing insert fails, the session stays unfulfilled and the
    /// next call retries the insert.
    pub async fn confirm(&self, session_id: &str) -> Result<PaymentOutcome, Error> {
        let token = self.grabi.auth().access_token()?;
        let session = self.session(session_id).await?;

        if let Some(listing_id) = session.listing_id {
            debug!("checkout session {} already fulfilled", session_id);
            return Ok(PaymentOutcome::Published { listing_id });
        }

        let provider_session = self
            .provider
            .get_session(&session.provider_session_id, &token)
            .await?;

        match verdict(&provider_session) {
            Verdict::Paid => {
                let listing_id = self.publish_staged(&session).await?;
                let completion = CheckoutCompletion {
                    checkout_status: CheckoutStatus::Complete,
                    payment_status: PaymentStatus::Succeeded,
                    listing_id: listing_id.clone(),
                    completed_at: provider_session.when_completed.unwrap_or_else(Utc::now),
                };
                if let Err(e) = self
                    .grabi
                    .from(CHECKOUT_SESSIONS_TABLE)
                    .update(&completion)
                    .eq("id", session_id)
                    .execute_no_return()
                    .await
                {
                    error!(
                        "listing {} published but checkout session {} not marked complete: {}",
                        listing_id, session_id, e
                    );
                }

                info!("listing {} published from checkout {}", listing_id, session_id);
                Ok(PaymentOutcome::Published { listing_id })
            }
            Verdict::Pending => {
                debug!("checkout session {} still processing", session_id);
                Ok(PaymentOutcome::Pending)
            }
            Verdict::Failed(reason) => {
                let update = CheckoutStatusUpdate {
                    checkout_status: provider_session.checkout_status.clone(),
                    payment_status: provider_session.payment_status.clone(),
                };
                if let Err(e) = self
                    .grabi
                    .from(CHECKOUT_SESSIONS_TABLE)
                    .update(&update)
                    .eq("id", session_id)
                    .execute_no_return()
                    .await
                {
                    warn!("could not record status of checkout {}: {}", session_id, e);
                }

                info!("checkout session {} ended without payment: {:?}", session_id, reason);
                Ok(PaymentOutcome::Failed(PaymentError::new(reason)))
            }
        }
    }

    async fn publish_staged(&self, session: &CheckoutSession) -> Result<String, Error> {
        let listing = session.staged_listing()?;

        let inserted = self
            .grabi
            .from(LISTINGS_TABLE)
            .insert(&listing)
            .execute::<Vec<Listing>>()
            .await
            .map_err(|e| {
                error!(
                    "payment for checkout {} succeeded but the listing insert failed: {}",
                    session.id, e
                );
                e
            })?;

        inserted
            .into_iter()
            .next()
            .map(|l| l.id)
            .ok_or_else(|| Error::database("listing insert returned no row"))
    }

    /// [`confirm`](Self::confirm) with the session id read from a return URL
    pub async fn confirm_from_return_url(&self, return_url: &str) -> Result<PaymentOutcome, Error> {
        let session_id = session_id_from_url(return_url)?;
        self.confirm(&session_id).await
    }
}

/// Read `session_id` from a payment return URL
pub fn session_id_from_url(return_url: &str) -> Result<String, Error> {
    let url = Url::parse(return_url)?;
    url.query_pairs()
        .find(|(key, _)| key == SESSION_ID_PARAM)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.trim().is_empty())
        .ok_or(Error::Validation(MessageKey::PaymentMissingSessionId))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_id_read_from_return_url() {
        let id = session_id_from_url("https://grabi.sn/payment/success?session_id=abc-123&x=1")
            .unwrap();
        assert_eq!(id, "abc-123");
    }

    #[test]
    fn missing_session_id_is_a_validation_error() {
        for url in [
            "https://grabi.sn/payment/error",
            "https://grabi.sn/payment/error?session_id=",
        ] {
            assert!(matches!(
                session_id_from_url(url),
                Err(Error::Validation(MessageKey::PaymentMissingSessionId))
            ));
        }
    }

    #[test]
    fn return_urls_carry_session_id() {
        let grabi = Grabi::new_with_options(
            "http://localhost:54321",
            "anon",
            crate::config::ClientOptions::default().with_site_url("https://grabi.sn/"),
        );
        let (ok, err) = grabi.publication().return_urls("s1");
        assert_eq!(ok, "https://grabi.sn/payment/success?session_id=s1");
        assert_eq!(err, "https://grabi.sn/payment/error?session_id=s1");
    }
}
