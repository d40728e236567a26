//! Browsing and seller-side management of listings

use chrono::Utc;
use log::{debug, warn};
use serde::Serialize;
use serde_json::json;

use crate::error::Error;
use crate::models::{Listing, ListingFilter, ListingStatus, LISTINGS_TABLE};
use crate::postgrest::{contains_pattern, Filterable, Page, SelectBuilder};
use crate::Grabi;

/// Function bumping `views_count` server-side
pub const INCREMENT_VIEWS_RPC: &str = "increment_listing_views";

/// Queries and mutations on the `listings` table
pub struct ListingService {
    grabi: Grabi,
}

fn apply_filter(mut query: SelectBuilder, filter: &ListingFilter) -> SelectBuilder {
    if let Some(category) = filter.category_id.as_deref().filter(|c| !c.is_empty()) {
        query = query.eq("category_id", category);
    }
    if let Some(sub) = filter.subcategory_id.as_deref().filter(|s| !s.is_empty()) {
        query = query.eq("subcategory_id", sub);
    }
    if let Some(term) = filter.search.as_deref().filter(|t| !t.trim().is_empty()) {
        query = query.ilike("title", &contains_pattern(term));
    }
    if let Some(location) = filter.location.as_deref().filter(|l| !l.trim().is_empty()) {
        query = query.ilike("location", &contains_pattern(location));
    }
    if let Some(min) = filter.min_price {
        query = query.gte("price", min);
    }
    if let Some(max) = filter.max_price {
        query = query.lte("price", max);
    }
    query
}

impl ListingService {
    pub(crate) fn new(grabi: Grabi) -> Self {
        Self { grabi }
    }

    /// Active listings matching the filter, newest first
    pub async fn browse(&self, filter: &ListingFilter, offset: u32) -> Result<Page<Listing>, Error> {
        let query = self
            .grabi
            .from(LISTINGS_TABLE)
            .select("*")
            .eq("status", ListingStatus::Active);
        let query = apply_filter(query, filter).order("created_at", false);

        debug!("browsing listings {:?} from {}", filter, offset);
        query
            .execute_page::<Listing>(offset, self.grabi.options.listings_page_size)
            .await
    }

    /// Latest active listings for the home page
    pub async fn latest(&self, limit: u32) -> Result<Vec<Listing>, Error> {
        self.grabi
            .from(LISTINGS_TABLE)
            .select("*")
            .eq("status", ListingStatus::Active)
            .order("created_at", false)
            .limit(limit)
            .execute::<Listing>()
            .await
    }

    /// One listing by id
    pub async fn get(&self, listing_id: &str) -> Result<Option<Listing>, Error> {
        self.grabi
            .from(LISTINGS_TABLE)
            .select("*")
            .eq("id", listing_id)
            .execute_one::<Listing>()
            .await
    }

    /// Listing detail page: fetch the row and count the view
    ///
    /// Sellers looking at their own listing do not bump the counter. A failed
    /// counter update does not fail the page.
    pub async fn view(&self, listing_id: &str) -> Result<Listing, Error> {
        let mut listing = self
            .get(listing_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("listing {}", listing_id)))?;

        let own = self
            .grabi
            .auth()
            .user_id()
            .map(|id| id == listing.user_id)
            .unwrap_or(false);
        if !own {
            match self.record_view(listing_id).await {
                Ok(()) => listing.views_count += 1,
                Err(e) => warn!("could not count view of {}: {}", listing_id, e),
            }
        }

        Ok(listing)
    }

    /// Bump the view counter
    pub async fn record_view(&self, listing_id: &str) -> Result<(), Error> {
        self.grabi
            .from(LISTINGS_TABLE)
            .rpc(INCREMENT_VIEWS_RPC, json!({ "listing_id": listing_id }))
            .execute_no_return()
            .await
    }

    /// Other active listings of the same category
    pub async fn similar(&self, listing: &Listing, limit: u32) -> Result<Vec<Listing>, Error> {
        self.grabi
            .from(LISTINGS_TABLE)
            .select("*")
            .eq("status", ListingStatus::Active)
            .eq("category_id", &listing.category_id)
            .neq("id", &listing.id)
            .order("created_at", false)
            .limit(limit)
            .execute::<Listing>()
            .await
    }

    /// Public listings of a seller, for their profile page
    pub async fn by_seller(&self, seller_id: &str) -> Result<Vec<Listing>, Error> {
        self.grabi
            .from(LISTINGS_TABLE)
            .select("*")
            .eq("user_id", seller_id)
            .eq("status", ListingStatus::Active)
            .order("created_at", false)
            .execute::<Listing>()
            .await
    }

    /// Every listing of the signed-in user, whatever its status
    pub async fn mine(&self) -> Result<Vec<Listing>, Error> {
        let user_id = self.grabi.auth().user_id()?;
        self.grabi
            .from(LISTINGS_TABLE)
            .select("*")
            .eq("user_id", &user_id)
            .order("created_at", false)
            .execute::<Listing>()
            .await
    }

    /// Mark one of the user's listings sold, inactive or active again
    pub async fn set_status(&self, listing_id: &str, status: ListingStatus) -> Result<Listing, Error> {
        let user_id = self.grabi.auth().user_id()?;

        #[derive(Serialize)]
        struct StatusPatch {
            status: ListingStatus,
            updated_at: chrono::DateTime<Utc>,
        }

        let rows = self
            .grabi
            .from(LISTINGS_TABLE)
            .update(StatusPatch {
                status,
                updated_at: Utc::now(),
            })
            .eq("id", listing_id)
            .eq("user_id", &user_id)
            .execute::<Vec<Listing>>()
            .await?;

        rows.into_iter()
            .next()
            .ok_or_else(|| Error::not_found(format!("listing {}", listing_id)))
    }

    /// Delete one of the user's listings and its photos
    pub async fn delete(&self, listing_id: &str) -> Result<(), Error> {
        let user_id = self.grabi.auth().user_id()?;

        let deleted = self
            .grabi
            .from(LISTINGS_TABLE)
            .delete()
            .eq("id", listing_id)
            .eq("user_id", &user_id)
            .execute::<Vec<Listing>>()
            .await?;

        let Some(listing) = deleted.into_iter().next() else {
            return Err(Error::not_found(format!("listing {}", listing_id)));
        };

        let storage = self.grabi.storage();
        let bucket = storage.from(&self.grabi.options.buckets.listing_images);
        let paths: Vec<String> = listing
            .images
            .iter()
            .filter_map(|url| bucket.path_from_public_url(url))
            .collect();
        if !paths.is_empty() {
            if let Err(e) = bucket.remove(&paths).await {
                warn!("listing {} deleted but its images were not: {}", listing_id, e);
            }
        }

        Ok(())
    }
}
