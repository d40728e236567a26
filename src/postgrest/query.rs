//! Query builders for PostgrestClient

use reqwest::{Client, Method};
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;

use crate::error::Error;
use crate::fetch::FetchBuilder;
use crate::postgrest::filter::*;
use crate::postgrest::types::*;

/// Everything a builder needs to issue its request
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Endpoint URL
    pub(crate) url: String,

    /// The API key
    pub(crate) key: String,

    /// Bearer token; the API key is used when absent
    pub(crate) token: Option<String>,

    /// HTTP client
    pub(crate) client: Client,

    /// Per-request timeout
    pub(crate) timeout: Option<Duration>,

    /// Database schema; PostgREST serves `public` when none is sent
    pub(crate) schema: Option<String>,
}

impl RequestContext {
    fn fetch(&self, method: Method) -> FetchBuilder<'_> {
        let token = self.token.as_deref().unwrap_or(&self.key);
        let profile_header = if method == Method::GET || method == Method::HEAD {
            "Accept-Profile"
        } else {
            "Content-Profile"
        };

        let mut fetch = FetchBuilder::new(&self.client, &self.url, method)
            .api_key(&self.key)
            .bearer_auth(token)
            .timeout(self.timeout);
        if let Some(schema) = &self.schema {
            fetch = fetch.header(profile_header, schema);
        }
        fetch
    }
}

/// Ordered query parameters
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    params: Vec<(String, String)>,
}

impl QueryBuilder {
    /// Create a new QueryBuilder
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a parameter; the same column may be filtered more than once
    pub fn add_param(&mut self, key: &str, value: &str) {
        self.params.push((key.to_string(), value.to_string()));
    }

    /// Set a parameter, replacing any previous value for the key
    pub fn set_param(&mut self, key: &str, value: &str) {
        self.params.retain(|(k, _)| k != key);
        self.add_param(key, value);
    }

    /// Get the query parameters
    pub fn get_params(&self) -> &[(String, String)] {
        &self.params
    }
}

/// Row filters shared by SELECT, UPDATE and DELETE builders
pub trait Filterable: Sized {
    /// Mutable access to the builder's query parameters
    fn query_mut(&mut self) -> &mut QueryBuilder;

    /// Filter rows with an arbitrary operator
    fn filter<V: ToString>(mut self, column: &str, operator: FilterOperator, value: V) -> Self {
        let filter = operator.apply(&value.to_string());
        self.query_mut().add_param(column, &filter);
        self
    }

    /// Filter rows where column equals a value
    fn eq<V: ToString>(self, column: &str, value: V) -> Self {
        self.filter(column, FilterOperator::Eq, value)
    }

    /// Filter rows where column does not equal a value
    fn neq<V: ToString>(self, column: &str, value: V) -> Self {
        self.filter(column, FilterOperator::Neq, value)
    }

    /// Filter rows where column is greater than or equal to a value
    fn gte<V: ToString>(self, column: &str, value: V) -> Self {
        self.filter(column, FilterOperator::Gte, value)
    }

    /// Filter rows where column is less than or equal to a value
    fn lte<V: ToString>(self, column: &str, value: V) -> Self {
        self.filter(column, FilterOperator::Lte, value)
    }

    /// Filter rows where column matches a pattern (case insensitive)
    fn ilike(self, column: &str, pattern: &str) -> Self {
        self.filter(column, FilterOperator::ILike, pattern)
    }
}

/// Builder for SELECT queries
#[derive(Debug, Clone)]
pub struct SelectBuilder {
    ctx: RequestContext,
    query: QueryBuilder,
    count: Option<CountOption>,
}

impl Filterable for SelectBuilder {
    fn query_mut(&mut self) -> &mut QueryBuilder {
        &mut self.query
    }
}

impl SelectBuilder {
    /// Create a new SelectBuilder
    pub fn new(ctx: RequestContext, columns: &str) -> Self {
        let mut query = QueryBuilder::new();
        query.set_param("select", columns);

        Self {
            ctx,
            query,
            count: None,
        }
    }

    /// Limit the number of rows returned
    pub fn limit(mut self, count: u32) -> Self {
        self.query.set_param("limit", &count.to_string());
        self
    }

    /// Skip a number of rows
    pub fn offset(mut self, count: u32) -> Self {
        self.query.set_param("offset", &count.to_string());
        self
    }

    /// Order the results by a column
    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        let direction = if ascending { "asc" } else { "desc" };
        self.query.set_param("order", &format!("{}.{}", column, direction));
        self
    }

    /// Ask the backend to report the total number of matching rows
    pub fn count(mut self, option: CountOption) -> Self {
        self.count = Some(option);
        self
    }

    fn fetch(&self) -> FetchBuilder<'_> {
        let mut fetch = self.ctx.fetch(Method::GET).query(self.query.get_params());
        if let Some(count) = self.count {
            fetch = fetch.header("Prefer", &format!("count={}", count.as_str()));
        }
        fetch
    }

    /// Execute the query and return the results
    pub async fn execute<T: DeserializeOwned>(&self) -> Result<Vec<T>, Error> {
        self.fetch().execute::<Vec<T>>().await
    }

    /// Execute the query and return the first row
    pub async fn execute_one<T: DeserializeOwned>(self) -> Result<Option<T>, Error> {
        let results = self.limit(1).execute::<T>().await?;
        Ok(results.into_iter().next())
    }

    /// Fetch the window `[offset, offset + limit)` along with the total count
    pub async fn execute_page<T: DeserializeOwned>(
        self,
        offset: u32,
        limit: u32,
    ) -> Result<Page<T>, Error> {
        let builder = self.count(CountOption::Exact).offset(offset).limit(limit);
        let (items, total) = builder.fetch().execute_with_count::<Vec<T>>().await?;

        Ok(Page {
            items,
            total,
            offset,
            limit,
        })
    }
}

/// Builder for INSERT queries
#[derive(Debug, Clone)]
pub struct InsertBuilder<T: Serialize> {
    ctx: RequestContext,
    values: T,
}

impl<T: Serialize> InsertBuilder<T> {
    /// Create a new InsertBuilder
    pub fn new(ctx: RequestContext, values: T) -> Self {
        Self { ctx, values }
    }

    /// Execute the query and return the inserted rows
    pub async fn execute<R: DeserializeOwned>(&self) -> Result<R, Error> {
        self.ctx
            .fetch(Method::POST)
            .header("Prefer", ReturnOption::Representation.prefer())
            .json(&self.values)?
            .execute::<R>()
            .await
    }

    /// Execute the query without returning the inserted data
    pub async fn execute_no_return(&self) -> Result<(), Error> {
        self.ctx
            .fetch(Method::POST)
            .header("Prefer", ReturnOption::Minimal.prefer())
            .json(&self.values)?
            .execute_empty()
            .await
    }
}

/// Builder for UPDATE queries
#[derive(Debug, Clone)]
pub struct UpdateBuilder<T: Serialize> {
    ctx: RequestContext,
    values: T,
    query: QueryBuilder,
}

impl<T: Serialize> Filterable for UpdateBuilder<T> {
    fn query_mut(&mut self) -> &mut QueryBuilder {
        &mut self.query
    }
}

impl<T: Serialize> UpdateBuilder<T> {
    /// Create a new UpdateBuilder
    pub fn new(ctx: RequestContext, values: T) -> Self {
        Self {
            ctx,
            values,
            query: QueryBuilder::new(),
        }
    }

    /// Execute the query and return the updated rows
    pub async fn execute<R: DeserializeOwned>(&self) -> Result<R, Error> {
        self.ctx
            .fetch(Method::PATCH)
            .header("Prefer", ReturnOption::Representation.prefer())
            .query(self.query.get_params())
            .json(&self.values)?
            .execute::<R>()
            .await
    }

    /// Execute the query without returning the updated data
    pub async fn execute_no_return(&self) -> Result<(), Error> {
        self.ctx
            .fetch(Method::PATCH)
            .header("Prefer", ReturnOption::Minimal.prefer())
            .query(self.query.get_params())
            .json(&self.values)?
            .execute_empty()
            .await
    }
}

/// Builder for UPSERT queries
#[derive(Debug, Clone)]
pub struct UpsertBuilder<T: Serialize> {
    ctx: RequestContext,
    values: T,
    query: QueryBuilder,
}

impl<T: Serialize> UpsertBuilder<T> {
    /// Create a new UpsertBuilder
    pub fn new(ctx: RequestContext, values: T) -> Self {
        Self {
            ctx,
            values,
            query: QueryBuilder::new(),
        }
    }

    /// Specify the column(s) to check for conflicts
    pub fn on_conflict(mut self, columns: &str) -> Self {
        self.query.set_param("on_conflict", columns);
        self
    }

    /// Execute the query and return the written rows
    pub async fn execute<R: DeserializeOwned>(&self) -> Result<R, Error> {
        self.ctx
            .fetch(Method::POST)
            .header(
                "Prefer",
                &format!(
                    "resolution=merge-duplicates,{}",
                    ReturnOption::Representation.prefer()
                ),
            )
            .query(self.query.get_params())
            .json(&self.values)?
            .execute::<R>()
            .await
    }
}

/// Builder for DELETE queries
#[derive(Debug, Clone)]
pub struct DeleteBuilder {
    ctx: RequestContext,
    query: QueryBuilder,
}

impl Filterable for DeleteBuilder {
    fn query_mut(&mut self) -> &mut QueryBuilder {
        &mut self.query
    }
}

impl DeleteBuilder {
    /// Create a new DeleteBuilder
    pub fn new(ctx: RequestContext) -> Self {
        Self {
            ctx,
            query: QueryBuilder::new(),
        }
    }

    /// Execute the query and return the deleted rows
    pub async fn execute<R: DeserializeOwned>(&self) -> Result<R, Error> {
        self.ctx
            .fetch(Method::DELETE)
            .header("Prefer", ReturnOption::Representation.prefer())
            .query(self.query.get_params())
            .execute::<R>()
            .await
    }

    /// Execute the query without returning the deleted data
    pub async fn execute_no_return(&self) -> Result<(), Error> {
        self.ctx
            .fetch(Method::DELETE)
            .header("Prefer", ReturnOption::Minimal.prefer())
            .query(self.query.get_params())
            .execute_empty()
            .await
    }
}

/// Builder for RPC (stored procedure) calls
#[derive(Debug, Clone)]
pub struct RpcBuilder<T: Serialize> {
    ctx: RequestContext,
    params: T,
}

impl<T: Serialize> RpcBuilder<T> {
    /// Create a new RpcBuilder
    pub fn new(ctx: RequestContext, params: T) -> Self {
        Self { ctx, params }
    }

    /// Execute the RPC call and return the results
    pub async fn execute<R: DeserializeOwned>(&self) -> Result<R, Error> {
        self.ctx
            .fetch(Method::POST)
            .json(&self.params)?
            .execute::<R>()
            .await
    }

    /// Execute the RPC call, ignoring whatever the function returns
    pub async fn execute_no_return(&self) -> Result<(), Error> {
        self.ctx
            .fetch(Method::POST)
            .json(&self.params)?
            .execute_empty()
            .await
    }
}
