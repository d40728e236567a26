//! Grabi marketplace client
//!
//! Client core of the Grabi classifieds marketplace: typed access to the
//! hosted backend (auth, rows, object storage, serverless functions) and the
//! application services the frontend pages call: session bootstrap,
//! profiles, browsing, publication behind the listing-fee payment, and seller
//! reviews.

pub mod auth;
pub mod config;
pub mod error;
pub mod fetch;
pub mod format;
pub mod functions;
pub mod i18n;
pub mod models;
pub mod payment;
pub mod postgrest;
pub mod services;
pub mod storage;
pub mod stores;

use reqwest::Client;
use std::sync::Arc;

use crate::auth::Auth;
use crate::config::{ClientOptions, GrabiConfig};
use crate::error::Error;
use crate::functions::FunctionsClient;
use crate::payment::{PaymentProvider, ProxyPaymentProvider};
use crate::postgrest::PostgrestClient;
use crate::services::{
    CatalogService, ListingService, ProfileService, PublicationService, ReviewService,
};
use crate::storage::StorageClient;

/// The main entry point of the client
#[derive(Clone)]
pub struct Grabi {
    /// The base URL of the backend project, without trailing slash
    pub url: String,
    /// The anonymous API key of the project
    pub key: String,
    /// HTTP client used for requests
    pub http_client: Client,
    /// Auth client holding the current session
    pub auth: Auth,
    /// Client options
    pub options: ClientOptions,
}

impl Grabi {
    /// Create a new client
    ///
    /// # Example
    ///
    /// ```
    /// use grabi::Grabi;
    ///
    /// let grabi = Grabi::new("https://your-project.supabase.co", "your-anon-key");
    /// ```
    pub fn new(url: &str, key: &str) -> Self {
        Self::new_with_options(url, key, ClientOptions::default())
    }

    /// Create a new client with custom options
    ///
    /// # Example
    ///
    /// ```
    /// use grabi::{Grabi, config::ClientOptions};
    ///
    /// let options = ClientOptions::default().with_listing_fee(1500);
    /// let grabi = Grabi::new_with_options(
    ///     "https://your-project.supabase.co",
    ///     "your-anon-key",
    ///     options,
    /// );
    /// ```
    pub fn new_with_options(url: &str, key: &str, options: ClientOptions) -> Self {
        let url = url.trim_end_matches('/').to_string();
        let http_client = Client::new();
        let auth = Auth::new(&url, key, http_client.clone(), options.clone());

        Self {
            url,
            key: key.to_string(),
            http_client,
            auth,
            options,
        }
    }

    /// Create a client from a validated [`GrabiConfig`]
    pub fn from_config(config: &GrabiConfig, options: ClientOptions) -> Self {
        Self::new_with_options(&config.base_url(), &config.anon_key, options)
    }

    /// Create a client from the `GRABI_*` environment variables
    pub fn from_env() -> Result<Self, Error> {
        let config = GrabiConfig::from_env()?;
        let options = ClientOptions::from_env()?;
        Ok(Self::from_config(&config, options))
    }

    /// Get a reference to the auth client
    pub fn auth(&self) -> &Auth {
        &self.auth
    }

    /// Row client for a table, authorized as the signed-in user when there is one
    pub fn from(&self, table: &str) -> PostgrestClient {
        PostgrestClient::new(&self.url, &self.key, table, self.http_client.clone())
            .with_auth(&self.auth.bearer_or_anon())
            .with_timeout(self.options.request_timeout)
            .with_schema(&self.options.db_schema)
    }

    /// Storage client, authorized as the signed-in user when there is one
    pub fn storage(&self) -> StorageClient {
        StorageClient::new(&self.url, &self.key, self.http_client.clone())
            .with_auth(&self.auth.bearer_or_anon())
            .with_timeout(self.options.request_timeout)
    }

    /// Serverless functions client
    pub fn functions(&self) -> FunctionsClient {
        FunctionsClient::new(&self.url, &self.key, self.http_client.clone())
            .with_timeout(self.options.request_timeout)
    }

    /// Profiles: bootstrap, editing, avatar and banner
    pub fn profiles(&self) -> ProfileService {
        ProfileService::new(self.clone())
    }

    /// Browsing and managing listings
    pub fn listings(&self) -> ListingService {
        ListingService::new(self.clone())
    }

    /// Category taxonomy
    pub fn catalog(&self) -> CatalogService {
        CatalogService::new(self.clone())
    }

    /// Seller reviews
    pub fn reviews(&self) -> ReviewService {
        ReviewService::new(self.clone())
    }

    /// Publication flow paying the listing fee through the payment proxy
    pub fn publication(&self) -> PublicationService {
        let provider = ProxyPaymentProvider::new(
            self.functions(),
            &self.options.create_checkout_function,
            &self.options.get_checkout_function,
        );
        self.publication_with(Arc::new(provider))
    }

    /// Publication flow with a custom payment provider
    pub fn publication_with(&self, provider: Arc<dyn PaymentProvider>) -> PublicationService {
        PublicationService::new(self.clone(), provider)
    }
}

/// A convenience module for common imports
pub mod prelude {
    pub use crate::config::{ClientOptions, GrabiConfig};
    pub use crate::error::Error;
    pub use crate::i18n::{Locale, MessageKey};
    pub use crate::models::*;
    pub use crate::payment::{PaymentError, PaymentOutcome};
    pub use crate::storage::ImageUpload;
    pub use crate::Grabi;
}
