use grabi::auth::Session;
use grabi::error::Error;
use grabi::i18n::{Locale, MessageKey};
use grabi::services::ReviewListView;
use grabi::Grabi;
use serde_json::json;
use wiremock::matchers::{any, body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn signed_in_as(server: &MockServer, user_id: &str) -> Grabi {
    let grabi = Grabi::new(&server.uri(), "anon-key");
    grabi.auth().set_session(Session::new(
        format!("{}-token", user_id),
        "r".to_string(),
        user_id.to_string(),
        3600,
    ));
    grabi
}

#[tokio::test]
async fn self_review_is_rejected_without_a_request() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let grabi = signed_in_as(&server, "seller-1");
    let err = grabi
        .reviews()
        .submit("seller-1", 5, Some("Super vendeur"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::SelfReview));
    assert_eq!(err.user_message(Locale::En), "You cannot review yourself.");
}

#[tokio::test]
async fn out_of_range_rating_is_rejected_without_a_request() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let grabi = signed_in_as(&server, "buyer-1");
    let err = grabi.reviews().submit("seller-1", 6, None).await.unwrap_err();
    assert_eq!(err.message_key(), MessageKey::RatingOutOfRange);
}

#[tokio::test]
async fn submit_posts_review() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/seller_reviews"))
        .and(header("Authorization", "Bearer buyer-1-token"))
        .and(body_json(json!({
            "seller_id": "seller-1",
            "reviewer_id": "buyer-1",
            "rating": 4,
            "comment": "Rapide et honnête"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([{
            "id": "rev-1",
            "seller_id": "seller-1",
            "reviewer_id": "buyer-1",
            "rating": 4,
            "comment": "Rapide et honnête",
            "created_at": "2026-03-12T10:00:00Z",
            "updated_at": null
        }])))
        .expect(1)
        .mount(&server)
        .await;

    let grabi = signed_in_as(&server, "buyer-1");
    let review = grabi
        .reviews()
        .submit("seller-1", 4, Some(" Rapide et honnête "))
        .await
        .unwrap();
    assert_eq!(review.id, "rev-1");
}

#[tokio::test]
async fn second_review_of_same_seller_is_reported() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/seller_reviews"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "code": "23505",
            "message": "duplicate key value violates unique constraint \"seller_reviews_reviewer_id_seller_id_key\""
        })))
        .mount(&server)
        .await;

    let grabi = signed_in_as(&server, "buyer-1");
    let err = grabi.reviews().submit("seller-1", 3, None).await.unwrap_err();

    assert!(matches!(err, Error::Validation(MessageKey::ReviewAlreadyExists)));
    assert_eq!(
        err.user_message(Locale::Fr),
        "Vous avez déjà laissé un avis pour ce vendeur."
    );
}

#[tokio::test]
async fn seller_without_reviews_shows_empty_state() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/seller_reviews"))
        .and(query_param("seller_id", "eq.seller-1"))
        .and(query_param("order", "created_at.desc"))
        .and(query_param("limit", "10"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Range", "*/0")
                .set_body_json(json!([])),
        )
        .mount(&server)
        .await;

    let grabi = Grabi::new(&server.uri(), "anon-key");
    let view = grabi.reviews().view("seller-1", 0, Locale::Fr).await.unwrap();

    assert_eq!(view, ReviewListView::Empty("Aucun avis pour le moment."));
}

#[tokio::test]
async fn reviews_come_with_their_author() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/seller_reviews"))
        .and(query_param(
            "select",
            "*,reviewer:profiles!reviewer_id(full_name,avatar_url)",
        ))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Range", "0-0/1")
                .set_body_json(json!([{
                    "id": "rev-1",
                    "seller_id": "seller-1",
                    "reviewer_id": "buyer-1",
                    "rating": 5,
                    "comment": null,
                    "created_at": "2026-03-12T10:00:00Z",
                    "updated_at": null,
                    "reviewer": { "full_name": "Moussa Ndiaye", "avatar_url": null }
                }])),
        )
        .mount(&server)
        .await;

    let grabi = Grabi::new(&server.uri(), "anon-key");
    let page = grabi.reviews().list("seller-1", 0).await.unwrap();

    assert_eq!(page.total, Some(1));
    let author = page.items[0].reviewer.as_ref().unwrap();
    assert_eq!(author.full_name.as_deref(), Some("Moussa Ndiaye"));
}
