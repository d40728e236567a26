//! Serverless function client
//!
//! The payment provider is never called directly: its secret key lives in a
//! proxy function and the client only talks to that function.

use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use crate::error::Error;
use crate::fetch::{error_from_response, Fetch};

/// Client for the backend's edge functions
#[derive(Debug, Clone)]
pub struct FunctionsClient {
    /// The base URL for the project
    url: String,

    /// The anonymous API key for the project
    key: String,

    /// HTTP client
    client: Client,

    /// Per-request timeout
    timeout: Option<Duration>,
}

/// Response from a function
#[derive(Debug, Clone)]
pub struct FunctionResponse<T> {
    /// Response data
    pub data: T,

    /// Response status
    pub status: u16,

    /// Response headers
    pub headers: HashMap<String, String>,
}

/// Options for invoking a function
#[derive(Debug, Clone)]
pub struct FunctionInvokeOptions<T> {
    /// Request body
    pub body: Option<T>,

    /// Request headers
    pub headers: Option<HashMap<String, String>>,

    /// Authorization token
    pub authorization: Option<String>,
}

impl<T> Default for FunctionInvokeOptions<T> {
    fn default() -> Self {
        Self {
            body: None,
            headers: None,
            authorization: None,
        }
    }
}

impl<T> FunctionInvokeOptions<T> {
    /// Create new empty invoke options
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the request body
    pub fn with_body(mut self, body: T) -> Self {
        self.body = Some(body);
        self
    }

    /// Set a request header
    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        let headers = self.headers.get_or_insert_with(HashMap::new);
        headers.insert(key.to_string(), value.to_string());
        self
    }

    /// Set the authorization token
    pub fn with_auth(mut self, token: &str) -> Self {
        self.authorization = Some(token.to_string());
        self
    }
}

impl FunctionsClient {
    /// Create a new FunctionsClient
    pub(crate) fn new(url: &str, key: &str, client: Client) -> Self {
        Self {
            url: url.to_string(),
            key: key.to_string(),
            client,
            timeout: None,
        }
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    fn get_url(&self, function_name: &str) -> String {
        format!("{}/functions/v1/{}", self.url, function_name)
    }

    /// Invoke a function with a JSON body and decode its JSON answer
    pub async fn invoke<T: Serialize, R: DeserializeOwned>(
        &self,
        function_name: &str,
        invoke_options: &FunctionInvokeOptions<T>,
    ) -> Result<FunctionResponse<R>, Error> {
        let url = self.get_url(function_name);
        let token = invoke_options
            .authorization
            .as_deref()
            .unwrap_or(&self.key);

        let mut fetch = Fetch::post(&self.client, &url)
            .api_key(&self.key)
            .bearer_auth(token)
            .timeout(self.timeout);

        if let Some(headers) = &invoke_options.headers {
            for (key, value) in headers {
                fetch = fetch.header(key, value);
            }
        }

        if let Some(body) = &invoke_options.body {
            fetch = fetch.json(body)?;
        }

        let response = fetch.execute_raw().await?;
        let status = response.status().as_u16();

        let headers = response
            .headers()
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_str().unwrap_or("").to_string()))
            .collect();

        if !response.status().is_success() {
            let message = match error_from_response(response).await {
                Error::Api { message, .. } => message,
                other => other.to_string(),
            };
            return Err(Error::function(format!(
                "Function {} failed with status {}: {}",
                function_name, status, message
            )));
        }

        let data = response.json::<R>().await?;

        Ok(FunctionResponse {
            data,
            status,
            headers,
        })
    }
}
