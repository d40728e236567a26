use async_trait::async_trait;
use grabi::auth::Session;
use grabi::error::Error;
use grabi::i18n::{Locale, MessageKey};
use grabi::models::{CheckoutStatus, ListingDraft, PaymentStatus};
use grabi::payment::{
    CreateCheckoutRequest, FailureReason, PaymentOutcome, PaymentProvider, ProviderSession,
};
use grabi::storage::ImageUpload;
use grabi::Grabi;
use serde_json::{json, Value};
use std::sync::Arc;
use wiremock::matchers::{any, body_json, body_partial_json, header, method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SELLER: &str = "seller-1";
const TOKEN: &str = "seller-token";

fn signed_in(server: &MockServer) -> Grabi {
    let grabi = Grabi::new(&server.uri(), "anon-key");
    grabi.auth().set_session(Session::new(
        TOKEN.to_string(),
        "refresh".to_string(),
        SELLER.to_string(),
        3600,
    ));
    grabi
}

fn draft() -> ListingDraft {
    ListingDraft {
        title: "Moto Jakarta 2021".to_string(),
        description: "Très bon état, papiers à jour".to_string(),
        price: Some(450_000),
        currency: None,
        location: "Thiès".to_string(),
        category_id: "vehicules".to_string(),
        subcategory_id: Some("motos".to_string()),
        images: vec![ImageUpload::new("moto.jpg", "image/jpeg", vec![0xFF, 0xD8, 0xFF])],
    }
}

fn provider_session(checkout_status: &str, payment_status: &str) -> Value {
    json!({
        "id": "cos-1",
        "amount": "1000",
        "currency": "XOF",
        "checkout_status": checkout_status,
        "payment_status": payment_status,
        "wave_launch_url": "https://pay.wave.com/c/cos-1",
        "client_reference": "local-1",
        "when_created": "2026-03-12T10:00:00Z",
        "when_expires": "2026-03-12T10:30:00Z"
    })
}

fn checkout_row(listing_id: Option<&str>) -> Value {
    json!({
        "id": "local-1",
        "user_id": SELLER,
        "provider_session_id": "cos-1",
        "amount": 1000,
        "currency": "XOF",
        "checkout_status": "open",
        "payment_status": "processing",
        "launch_url": "https://pay.wave.com/c/cos-1",
        "listing_data": {
            "user_id": SELLER,
            "title": "Moto Jakarta 2021",
            "description": "Très bon état, papiers à jour",
            "price": 450000,
            "currency": "XOF",
            "location": "Thiès",
            "images": ["http://x/storage/v1/object/public/listing-images/seller-1/a.jpg"],
            "category_id": "vehicules",
            "subcategory_id": "motos",
            "status": "active"
        },
        "listing_id": listing_id,
        "created_at": "2026-03-12T10:00:00Z",
        "completed_at": null,
        "expires_at": "2026-03-12T10:30:00Z"
    })
}

async fn mount_checkout_row(server: &MockServer, listing_id: Option<&str>) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/checkout_sessions"))
        .and(query_param("id", "eq.local-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([checkout_row(listing_id)])))
        .mount(server)
        .await;
}

async fn mount_provider_state(server: &MockServer, checkout_status: &str, payment_status: &str) {
    Mock::given(method("POST"))
        .and(path("/functions/v1/get-checkout-session"))
        .and(header("Authorization", "Bearer seller-token"))
        .and(body_json(json!({ "session_id": "cos-1" })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(provider_session(checkout_status, payment_status)),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn start_uploads_images_and_opens_checkout() {
    let server = MockServer::start().await;
    let grabi = signed_in(&server);

    Mock::given(method("POST"))
        .and(path_regex(r"^/storage/v1/object/listing-images/seller-1/[0-9a-f-]+\.jpg$"))
        .and(header("Authorization", "Bearer seller-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Key": "listing-images/seller-1/x.jpg"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/functions/v1/create-checkout-session"))
        .and(body_partial_json(json!({ "amount": 1000, "currency": "XOF" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(provider_session("open", "processing")))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/checkout_sessions"))
        .and(header("Prefer", "return=minimal"))
        .and(body_partial_json(json!({
            "user_id": SELLER,
            "provider_session_id": "cos-1",
            "amount": 1000,
            "checkout_status": "open",
            "listing_data": { "title": "Moto Jakarta 2021", "price": 450000, "currency": "XOF" }
        })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let started = grabi.publication().start(draft()).await.unwrap();

    assert_eq!(started.launch_url, "https://pay.wave.com/c/cos-1");
    assert_eq!(started.session_id.len(), 36);
}

#[tokio::test]
async fn start_rejects_draft_without_images_before_any_request() {
    let server = MockServer::start().await;
    let grabi = signed_in(&server);

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut d = draft();
    d.images.clear();
    let err = grabi.publication().start(d).await.unwrap_err();

    assert!(matches!(err, Error::Validation(MessageKey::ImagesRequired)));
}

#[tokio::test]
async fn start_requires_a_session() {
    let server = MockServer::start().await;
    let grabi = Grabi::new(&server.uri(), "anon-key");

    let err = grabi.publication().start(draft()).await.unwrap_err();
    assert!(matches!(err, Error::NotAuthenticated));
}

#[tokio::test]
async fn paid_session_publishes_listing() {
    let server = MockServer::start().await;
    let grabi = signed_in(&server);

    mount_checkout_row(&server, None).await;
    mount_provider_state(&server, "complete", "succeeded").await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/listings"))
        .and(body_partial_json(json!({ "title": "Moto Jakarta 2021", "user_id": SELLER })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([{
            "id": "lst-1",
            "user_id": SELLER,
            "title": "Moto Jakarta 2021",
            "description": "Très bon état, papiers à jour",
            "price": 450000,
            "currency": "XOF",
            "location": "Thiès",
            "images": [],
            "category_id": "vehicules",
            "subcategory_id": "motos",
            "status": "active",
            "views_count": 0,
            "created_at": "2026-03-12T10:05:00Z",
            "updated_at": null
        }])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/checkout_sessions"))
        .and(query_param("id", "eq.local-1"))
        .and(body_partial_json(json!({
            "checkout_status": "complete",
            "payment_status": "succeeded",
            "listing_id": "lst-1"
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = grabi
        .publication()
        .confirm_from_return_url("https://grabi.sn/payment/success?session_id=local-1")
        .await
        .unwrap();

    assert_eq!(
        outcome,
        PaymentOutcome::Published {
            listing_id: "lst-1".to_string()
        }
    );
}

#[tokio::test]
async fn fulfilled_session_is_not_paid_twice() {
    let server = MockServer::start().await;
    let grabi = signed_in(&server);

    mount_checkout_row(&server, Some("lst-1")).await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let outcome = grabi.publication().confirm("local-1").await.unwrap();
    assert_eq!(
        outcome,
        PaymentOutcome::Published {
            listing_id: "lst-1".to_string()
        }
    );
}

fn published_listing_row() -> Value {
    json!([{
        "id": "lst-1",
        "user_id": SELLER,
        "title": "Moto Jakarta 2021",
        "description": "Très bon état, papiers à jour",
        "price": 450000,
        "currency": "XOF",
        "location": "Thiès",
        "images": [],
        "category_id": "vehicules",
        "subcategory_id": "motos",
        "status": "active",
        "views_count": 0,
        "created_at": "2026-03-12T10:05:00Z",
        "updated_at": null
    }])
}

#[tokio::test]
async fn failed_insert_leaves_session_open_for_a_retry() {
    let server = MockServer::start().await;
    let grabi = signed_in(&server);

    mount_checkout_row(&server, None).await;
    mount_provider_state(&server, "complete", "succeeded").await;

    {
        let _insert = Mock::given(method("POST"))
            .and(path("/rest/v1/listings"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "message": "boom" })))
            .expect(1)
            .mount_as_scoped(&server)
            .await;
        let _no_completion = Mock::given(method("PATCH"))
            .and(path("/rest/v1/checkout_sessions"))
            .respond_with(ResponseTemplate::new(204))
            .expect(0)
            .mount_as_scoped(&server)
            .await;

        let err = grabi.publication().confirm("local-1").await.unwrap_err();
        assert_eq!(err.status(), Some(500));
    }

    Mock::given(method("POST"))
        .and(path("/rest/v1/listings"))
        .respond_with(ResponseTemplate::new(201).set_body_json(published_listing_row()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/checkout_sessions"))
        .and(body_partial_json(json!({ "listing_id": "lst-1" })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = grabi.publication().confirm("local-1").await.unwrap();
    assert_eq!(
        outcome,
        PaymentOutcome::Published {
            listing_id: "lst-1".to_string()
        }
    );
}

#[tokio::test]
async fn refused_checkout_removes_uploaded_images() {
    let server = MockServer::start().await;
    let grabi = signed_in(&server);

    Mock::given(method("POST"))
        .and(path_regex(r"^/storage/v1/object/listing-images/seller-1/[0-9a-f-]+\.jpg$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Key": "listing-images/seller-1/x.jpg"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/functions/v1/create-checkout-session"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "error": "provider down" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/storage/v1/object/listing-images"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/checkout_sessions"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let err = grabi.publication().start(draft()).await.unwrap_err();
    assert!(matches!(err, Error::Payment(_)));

    let requests = server.received_requests().await.unwrap();
    let uploaded = requests
        .iter()
        .find(|r| r.url.path().starts_with("/storage/v1/object/listing-images/"))
        .map(|r| r.url.path().trim_start_matches("/storage/v1/object/listing-images/").to_string())
        .unwrap();
    let removal = requests
        .iter()
        .find(|r| r.url.path() == "/storage/v1/object/listing-images")
        .unwrap();
    let body: Value = serde_json::from_slice(&removal.body).unwrap();
    assert_eq!(body, json!({ "prefixes": [uploaded] }));
}

async fn confirm_unpaid(checkout_status: &str, payment_status: &str) -> PaymentOutcome {
    let server = MockServer::start().await;
    let grabi = signed_in(&server);

    mount_checkout_row(&server, None).await;
    mount_provider_state(&server, checkout_status, payment_status).await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/listings"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/checkout_sessions"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    grabi.publication().confirm("local-1").await.unwrap()
}

#[tokio::test]
async fn expired_session_offers_retry() {
    match confirm_unpaid("expired", "processing").await {
        PaymentOutcome::Failed(err) => {
            assert_eq!(err.reason, FailureReason::Expired);
            assert_eq!(err.message_key, MessageKey::PaymentSessionExpired);
            assert!(err.can_retry);
            assert_eq!(
                err.message(Locale::Fr),
                "La session de paiement a expiré. Veuillez réessayer."
            );
        }
        other => panic!("expected failure, got {:?}", other),
    }
}

#[tokio::test]
async fn expiry_wins_over_cancellation() {
    match confirm_unpaid("expired", "cancelled").await {
        PaymentOutcome::Failed(err) => assert_eq!(err.reason, FailureReason::Expired),
        other => panic!("expected failure, got {:?}", other),
    }
}

#[tokio::test]
async fn cancelled_payment_offers_retry() {
    match confirm_unpaid("complete", "cancelled").await {
        PaymentOutcome::Failed(err) => {
            assert_eq!(err.reason, FailureReason::Cancelled);
            assert!(err.can_retry);
            assert_eq!(err.message(Locale::En), "The payment was cancelled.");
        }
        other => panic!("expected failure, got {:?}", other),
    }
}

#[tokio::test]
async fn unknown_terminal_state_is_a_generic_retryable_error() {
    match confirm_unpaid("complete", "processing").await {
        PaymentOutcome::Failed(err) => {
            assert_eq!(err.reason, FailureReason::Error);
            assert_eq!(err.message_key, MessageKey::PaymentFailed);
            assert!(err.can_retry);
        }
        other => panic!("expected failure, got {:?}", other),
    }
}

#[tokio::test]
async fn unknown_session_id_is_reported() {
    let server = MockServer::start().await;
    let grabi = signed_in(&server);

    Mock::given(method("GET"))
        .and(path("/rest/v1/checkout_sessions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let err = grabi.publication().confirm("nope").await.unwrap_err();
    assert_eq!(err.message_key(), MessageKey::PaymentSessionNotFound);
}

struct StillOpen;

#[async_trait]
impl PaymentProvider for StillOpen {
    async fn create_session(
        &self,
        _request: &CreateCheckoutRequest,
        _access_token: &str,
    ) -> Result<ProviderSession, Error> {
        Err(Error::payment("not used"))
    }

    async fn get_session(
        &self,
        provider_session_id: &str,
        _access_token: &str,
    ) -> Result<ProviderSession, Error> {
        Ok(ProviderSession {
            id: provider_session_id.to_string(),
            amount: 1000,
            currency: "XOF".to_string(),
            checkout_status: CheckoutStatus::Open,
            payment_status: PaymentStatus::Processing,
            launch_url: "https://pay.wave.com/c/cos-1".to_string(),
            client_reference: None,
            when_created: None,
            when_completed: None,
            when_expires: None,
            last_payment_error: None,
        })
    }
}

#[tokio::test]
async fn open_session_is_pending_with_custom_provider() {
    let server = MockServer::start().await;
    let grabi = signed_in(&server);
    mount_checkout_row(&server, None).await;

    let outcome = grabi
        .publication_with(Arc::new(StillOpen))
        .confirm("local-1")
        .await
        .unwrap();

    assert_eq!(outcome, PaymentOutcome::Pending);
    assert_eq!(outcome.message_key(), MessageKey::PaymentPending);
}
