//! Row operations through the PostgREST API

mod filter;
mod query;
mod types;

use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

pub use filter::*;
pub use query::*;
pub use types::*;

/// Client for one table or view
#[derive(Debug, Clone)]
pub struct PostgrestClient {
    /// The base URL for the project
    url: String,

    /// The anonymous API key for the project
    key: String,

    /// The table or view name
    table: String,

    /// HTTP client
    client: Client,

    /// User access token
    token: Option<String>,

    /// Per-request timeout
    timeout: Option<Duration>,

    /// Database schema
    schema: Option<String>,
}

impl PostgrestClient {
    /// Create a new PostgrestClient
    pub(crate) fn new(url: &str, key: &str, table: &str, client: Client) -> Self {
        Self {
            url: url.to_string(),
            key: key.to_string(),
            table: table.to_string(),
            client,
            token: None,
            timeout: None,
            schema: None,
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

    /// Target a schema other than `public`
    pub fn with_schema(mut self, schema: &str) -> Self {
        self.schema = Some(schema).filter(|s| *s != "public").map(str::to_string);
        self
    }

    /// Name of the table this client targets
    pub fn table(&self) -> &str {
        &self.table
    }

    fn context(&self, url: String) -> RequestContext {
        RequestContext {
            url,
            key: self.key.clone(),
            token: self.token.clone(),
            client: self.client.clone(),
            timeout: self.timeout,
            schema: self.schema.clone(),
        }
    }

    fn table_context(&self) -> RequestContext {
        self.context(format!("{}/rest/v1/{}", self.url, self.table))
    }

    /// Select specific columns from the table
    pub fn select(&self, columns: &str) -> SelectBuilder {
        SelectBuilder::new(self.table_context(), columns)
    }

    /// Insert data into the table
    pub fn insert<T: Serialize>(&self, values: T) -> InsertBuilder<T> {
        InsertBuilder::new(self.table_context(), values)
    }

    /// Update data in the table
    pub fn update<T: Serialize>(&self, values: T) -> UpdateBuilder<T> {
        UpdateBuilder::new(self.table_context(), values)
    }

    /// Upsert data in the table (insert or update if it exists)
    pub fn upsert<T: Serialize>(&self, values: T) -> UpsertBuilder<T> {
        UpsertBuilder::new(self.table_context(), values)
    }

    /// Delete data from the table
    pub fn delete(&self) -> DeleteBuilder {
        DeleteBuilder::new(self.table_context())
    }

    /// Call a stored procedure or function
    pub fn rpc<T: Serialize>(&self, function: &str, params: T) -> RpcBuilder<T> {
        RpcBuilder::new(
            self.context(format!("{}/rest/v1/rpc/{}", self.url, function)),
            params,
        )
    }
}
