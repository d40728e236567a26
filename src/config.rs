//! Configuration for the Grabi client

use std::time::Duration;
use url::Url;

use crate::error::Error;
use crate::i18n::Locale;

/// Connection settings for the hosted backend
#[derive(Debug, Clone)]
pub struct GrabiConfig {
    /// Project URL of the hosted backend
    pub url: Url,

    /// Public (anonymous) API key
    pub anon_key: String,
}

impl GrabiConfig {
    /// Creates a new configuration, validating the URL and key
    pub fn new(url_str: &str, anon_key: &str) -> Result<Self, Error> {
        let url = Url::parse(url_str)?;
        if anon_key.trim().is_empty() {
            return Err(Error::config("anon_key cannot be empty"));
        }
        Ok(Self {
            url,
            anon_key: anon_key.to_string(),
        })
    }

    /// Reads `GRABI_SUPABASE_URL` and `GRABI_SUPABASE_ANON_KEY`
    pub fn from_env() -> Result<Self, Error> {
        let url = std::env::var("GRABI_SUPABASE_URL")
            .map_err(|_| Error::config("GRABI_SUPABASE_URL environment variable not found"))?;
        let key = std::env::var("GRABI_SUPABASE_ANON_KEY")
            .map_err(|_| Error::config("GRABI_SUPABASE_ANON_KEY environment variable not found"))?;
        Self::new(&url, &key)
    }

    /// Project URL without a trailing slash, ready for path concatenation
    pub fn base_url(&self) -> String {
        self.url.as_str().trim_end_matches('/').to_string()
    }
}

/// Storage bucket names
#[derive(Debug, Clone)]
pub struct Buckets {
    /// Profile pictures
    pub avatars: String,

    /// Profile banners
    pub banners: String,

    /// Listing photos
    pub listing_images: String,
}

impl Default for Buckets {
    fn default() -> Self {
        Self {
            avatars: "avatars".to_string(),
            banners: "banners".to_string(),
            listing_images: "listing-images".to_string(),
        }
    }
}

/// Configuration options for the Grabi client
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// The request timeout
    pub request_timeout: Option<Duration>,

    /// The database schema
    pub db_schema: String,

    /// Storage buckets
    pub buckets: Buckets,

    /// Fee charged to publish a listing
    pub listing_fee: i64,

    /// Currency of the listing fee (ISO 4217)
    pub fee_currency: String,

    /// Proxy function creating a checkout session
    pub create_checkout_function: String,

    /// Proxy function reading a checkout session
    pub get_checkout_function: String,

    /// Public URL of the web frontend, used to build payment return links
    pub site_url: String,

    /// Default interface language
    pub locale: Locale,

    /// Reviews fetched per page
    pub reviews_page_size: u32,

    /// Listings fetched per page
    pub listings_page_size: u32,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            request_timeout: Some(Duration::from_secs(30)),
            db_schema: "public".to_string(),
            buckets: Buckets::default(),
            listing_fee: 1000,
            fee_currency: "XOF".to_string(),
            create_checkout_function: "create-checkout-session".to_string(),
            get_checkout_function: "get-checkout-session".to_string(),
            site_url: "http://localhost:5173".to_string(),
            locale: Locale::Fr,
            reviews_page_size: 10,
            listings_page_size: 24,
        }
    }
}

impl ClientOptions {
    /// Defaults overridden by `GRABI_SITE_URL`, `GRABI_LISTING_FEE` and `GRABI_LOCALE`
    pub fn from_env() -> Result<Self, Error> {
        let mut options = Self::default();
        if let Ok(site_url) = std::env::var("GRABI_SITE_URL") {
            options = options.with_site_url(&site_url);
        }
        if let Ok(fee) = std::env::var("GRABI_LISTING_FEE") {
            let fee = fee
                .parse::<i64>()
                .map_err(|e| Error::config(format!("GRABI_LISTING_FEE: {}", e)))?;
            options = options.with_listing_fee(fee);
        }
        if let Ok(locale) = std::env::var("GRABI_LOCALE") {
            options.locale = locale.parse().map_err(Error::config)?;
        }
        Ok(options)
    }

    /// Set the request timeout
    pub fn with_request_timeout(mut self, value: Option<Duration>) -> Self {
        self.request_timeout = value;
        self
    }

    /// Set the database schema
    pub fn with_db_schema(mut self, value: &str) -> Self {
        self.db_schema = value.to_string();
        self
    }

    /// Set the storage bucket names
    pub fn with_buckets(mut self, value: Buckets) -> Self {
        self.buckets = value;
        self
    }

    /// Set the listing fee
    pub fn with_listing_fee(mut self, value: i64) -> Self {
        self.listing_fee = value;
        self
    }

    /// Set the public site URL
    pub fn with_site_url(mut self, value: &str) -> Self {
        self.site_url = value.trim_end_matches('/').to_string();
        self
    }

    /// Set the default locale
    pub fn with_locale(mut self, value: Locale) -> Self {
        self.locale = value;
        self
    }

    /// Set the reviews page size
    pub fn with_reviews_page_size(mut self, value: u32) -> Self {
        self.reviews_page_size = value.max(1);
        self
    }

    /// Set the listings page size
    pub fn with_listings_page_size(mut self, value: u32) -> Self {
        self.listings_page_size = value.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_new_valid() {
        let config = GrabiConfig::new("http://localhost:54321", "dummy-anon-key").unwrap();
        assert_eq!(config.url.to_string(), "http://localhost:54321/");
        assert_eq!(config.base_url(), "http://localhost:54321");
    }

    #[test]
    fn config_new_invalid_url() {
        match GrabiConfig::new("not a valid url", "key") {
            Err(Error::Url(_)) => {}
            other => panic!("Expected Url error, got {:?}", other),
        }
    }

    #[test]
    fn config_new_empty_key() {
        match GrabiConfig::new("http://localhost:54321", "  ") {
            Err(Error::Config(msg)) => assert!(msg.contains("anon_key")),
            other => panic!("Expected Config error, got {:?}", other),
        }
    }

    #[test]
    fn site_url_drops_trailing_slash() {
        let options = ClientOptions::default().with_site_url("https://grabi.sn/");
        assert_eq!(options.site_url, "https://grabi.sn");
    }
}
