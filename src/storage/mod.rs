//! Object storage for avatars, banners and listing photos

mod types;

use log::debug;
use reqwest::{multipart, Client};
use serde_json::json;
use std::time::Duration;

use crate::error::Error;
use crate::fetch::{error_from_response, Fetch, CLIENT_INFO};

pub use types::*;

/// Client for the backend's storage API
#[derive(Debug, Clone)]
pub struct StorageClient {
    /// The base URL for the project
    url: String,

    /// The anonymous API key for the project
    key: String,

    /// HTTP client used for requests
    client: Client,

    /// User access token
    token: Option<String>,

    /// Per-request timeout
    timeout: Option<Duration>,
}

/// Client for a specific storage bucket
pub struct BucketClient<'a> {
    /// Reference to the storage client
    storage: &'a StorageClient,

    /// The bucket ID
    bucket_id: String,
}

impl StorageClient {
    /// Create a new StorageClient
    pub(crate) fn new(url: &str, key: &str, client: Client) -> Self {
        Self {
            url: url.to_string(),
            key: key.to_string(),
            client,
            token: None,
            timeout: None,
        }
    }

    /// Authorize requests with a user's access token
    pub fn with_auth(mut self, token: &str) -> Self {
        self.token = Some(token.to_string());
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    fn get_url(&self, path: &str) -> String {
        format!("{}/storage/v1{}", self.url, path)
    }

    fn bearer(&self) -> &str {
        self.token.as_deref().unwrap_or(&self.key)
    }

    /// Get a client for a specific bucket
    pub fn from(&self, bucket_id: &str) -> BucketClient<'_> {
        BucketClient {
            storage: self,
            bucket_id: bucket_id.to_string(),
        }
    }
}

impl<'a> BucketClient<'a> {
    /// Upload a file to the bucket
    pub async fn upload(
        &self,
        path: &str,
        file_data: Vec<u8>,
        options: FileOptions,
    ) -> Result<UploadResponse, Error> {
        let url = self
            .storage
            .get_url(&format!("/object/{}/{}", self.bucket_id, path));

        let file_name = path.rsplit('/').next().unwrap_or(path).to_string();
        let mut part = multipart::Part::bytes(file_data).file_name(file_name);
        if let Some(content_type) = &options.content_type {
            part = part
                .mime_str(content_type)
                .map_err(|e| Error::storage(format!("invalid content type: {}", e)))?;
        }
        let form = multipart::Form::new().part("file", part);

        debug!("uploading {}/{}", self.bucket_id, path);

        let mut request = self
            .storage
            .client
            .post(&url)
            .header("apikey", &self.storage.key)
            .header("Authorization", format!("Bearer {}", self.storage.bearer()))
            .header("X-Client-Info", CLIENT_INFO)
            .header(
                "Cache-Control",
                options.cache_control.unwrap_or_else(|| "3600".to_string()),
            )
            .header("x-upsert", options.upsert.to_string())
            .multipart(form);
        if let Some(timeout) = self.storage.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return match error_from_response(response).await {
                Error::Api { status, message } => Err(Error::storage(format!(
                    "Upload failed with status {}: {}",
                    status, message
                ))),
                other => Err(other),
            };
        }

        let uploaded = response.json::<UploadResponse>().await?;
        Ok(uploaded)
    }

    /// Delete files in the bucket
    pub async fn remove(&self, paths: &[String]) -> Result<Vec<FileObject>, Error> {
        let url = self
            .storage
            .get_url(&format!("/object/{}", self.bucket_id));

        Fetch::delete(&self.storage.client, &url)
            .api_key(&self.storage.key)
            .bearer_auth(self.storage.bearer())
            .timeout(self.storage.timeout)
            .json(&json!({ "prefixes": paths }))?
            .execute::<Vec<FileObject>>()
            .await
    }

    /// Get the public URL for a file
    pub fn get_public_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.storage.url, self.bucket_id, path
        )
    }

    /// Recover the object path from one of this bucket's public URLs
    pub fn path_from_public_url(&self, public_url: &str) -> Option<String> {
        let marker = format!("/storage/v1/object/public/{}/", self.bucket_id);
        public_url
            .split_once(&marker)
            .map(|(_, path)| path.split('?').next().unwrap_or(path).to_string())
            .filter(|path| !path.is_empty())
    }
}
