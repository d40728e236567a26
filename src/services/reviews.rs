//! Seller reviews

use chrono::Utc;
use log::{debug, info};
use serde::Serialize;

use crate::error::Error;
use crate::i18n::{Locale, MessageKey};
use crate::models::{NewReview, ReviewUpdate, SellerReview, REVIEWS_TABLE, REVIEW_COLUMNS};
use crate::postgrest::{Filterable, Page};
use crate::Grabi;

/// What the reviews section of a seller page renders
#[derive(Debug, Clone, PartialEq)]
pub enum ReviewListView {
    /// No review on this page: show the translated empty-state text
    Empty(&'static str),

    /// Reviews to list, newest first
    Reviews(Page<SellerReview>),
}

impl ReviewListView {
    pub fn from_page(page: Page<SellerReview>, locale: Locale) -> Self {
        if page.is_empty() {
            ReviewListView::Empty(MessageKey::NoReviewsYet.text(locale))
        } else {
            ReviewListView::Reviews(page)
        }
    }
}

/// Rows of the `seller_reviews` table
pub struct ReviewService {
    grabi: Grabi,
}

impl ReviewService {
    pub(crate) fn new(grabi: Grabi) -> Self {
        Self { grabi }
    }

    /// A page of a seller's reviews, newest first
    pub async fn list(&self, seller_id: &str, offset: u32) -> Result<Page<SellerReview>, Error> {
        self.grabi
            .from(REVIEWS_TABLE)
            .select(REVIEW_COLUMNS)
            .eq("seller_id", seller_id)
            .order("created_at", false)
            .execute_page::<SellerReview>(offset, self.grabi.options.reviews_page_size)
            .await
    }

    /// [`list`](Self::list) ready for display
    pub async fn view(
        &self,
        seller_id: &str,
        offset: u32,
        locale: Locale,
    ) -> Result<ReviewListView, Error> {
        let page = self.list(seller_id, offset).await?;
        Ok(ReviewListView::from_page(page, locale))
    }

    /// Review the seller as the signed-in user
    ///
    /// Self-reviews and ratings outside 1 to 5 are refused before any request
    /// is sent. A second review of the same seller is refused by the backend
    /// and reported as [`MessageKey::ReviewAlreadyExists`].
    pub async fn submit(
        &self,
        seller_id: &str,
        rating: u8,
        comment: Option<&str>,
    ) -> Result<SellerReview, Error> {
        let reviewer_id = self.grabi.auth().user_id()?;
        let review = NewReview::new(&reviewer_id, seller_id, rating, comment)?;

        let rows = self
            .grabi
            .from(REVIEWS_TABLE)
            .insert(&review)
            .execute::<Vec<SellerReview>>()
            .await
            .map_err(|e| {
                if e.is_conflict() {
                    Error::Validation(MessageKey::ReviewAlreadyExists)
                } else {
                    e
                }
            })?;

        info!("{} reviewed seller {} ({}/5)", reviewer_id, seller_id, rating);
        rows.into_iter()
            .next()
            .ok_or_else(|| Error::database("review insert returned no row"))
    }

    /// The signed-in user's review of a seller, if any
    pub async fn own_review(&self, seller_id: &str) -> Result<Option<SellerReview>, Error> {
        let reviewer_id = self.grabi.auth().user_id()?;
        self.grabi
            .from(REVIEWS_TABLE)
            .select(REVIEW_COLUMNS)
            .eq("seller_id", seller_id)
            .eq("reviewer_id", &reviewer_id)
            .execute_one::<SellerReview>()
            .await
    }

    /// Whether the signed-in user already reviewed this seller
    pub async fn has_reviewed(&self, seller_id: &str) -> Result<bool, Error> {
        Ok(self.own_review(seller_id).await?.is_some())
    }

    /// Change the rating or comment of one of the user's reviews
    pub async fn update_own(
        &self,
        review_id: &str,
        rating: u8,
        comment: Option<&str>,
    ) -> Result<SellerReview, Error> {
        let reviewer_id = self.grabi.auth().user_id()?;
        let changes = ReviewUpdate::new(rating, comment)?;

        #[derive(Serialize)]
        struct Patch {
            #[serde(flatten)]
            changes: ReviewUpdate,
            updated_at: chrono::DateTime<Utc>,
        }

        let rows = self
            .grabi
            .from(REVIEWS_TABLE)
            .update(Patch {
                changes,
                updated_at: Utc::now(),
            })
            .eq("id", review_id)
            .eq("reviewer_id", &reviewer_id)
            .execute::<Vec<SellerReview>>()
            .await?;

        rows.into_iter()
            .next()
            .ok_or_else(|| Error::not_found(format!("review {}", review_id)))
    }

    /// Delete one of the user's reviews
    pub async fn delete_own(&self, review_id: &str) -> Result<(), Error> {
        let reviewer_id = self.grabi.auth().user_id()?;
        let deleted = self
            .grabi
            .from(REVIEWS_TABLE)
            .delete()
            .eq("id", review_id)
            .eq("reviewer_id", &reviewer_id)
            .execute::<Vec<SellerReview>>()
            .await?;

        if deleted.is_empty() {
            return Err(Error::not_found(format!("review {}", review_id)));
        }
        debug!("review {} deleted", review_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(items: Vec<SellerReview>) -> Page<SellerReview> {
        Page {
            total: Some(items.len() as u64),
            items,
            offset: 0,
            limit: 10,
        }
    }

    #[test]
    fn empty_page_shows_translated_text() {
        assert_eq!(
            ReviewListView::from_page(page(vec![]), Locale::Fr),
            ReviewListView::Empty("Aucun avis pour le moment.")
        );
    }

    #[test]
    fn non_empty_page_is_listed() {
        let review = SellerReview {
            id: "r1".into(),
            seller_id: "s".into(),
            reviewer_id: "b".into(),
            rating: 4,
            comment: None,
            created_at: None,
            updated_at: None,
            reviewer: None,
        };
        match ReviewListView::from_page(page(vec![review]), Locale::En) {
            ReviewListView::Reviews(p) => assert_eq!(p.items.len(), 1),
            other => panic!("expected reviews, got {:?}", other),
        }
    }
}
