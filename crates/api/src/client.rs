//! Typed client for the Airtable Web API.

use crate::config::{ClientConfig, RetryConfig};
use crate::error::{AirtableError, Result};
use crate::retry::with_retry;
use crate::schema::{
    Base, CreateTableRequest, DeletedRecord, Field, FieldSpec, FieldUpdate, ListBasesResponse,
    ListRecordsResponse, ListTablesResponse, Record, Table, UpdateTableRequest,
};
use reqwest::{header, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Production endpoint of the Airtable Web API.
pub const AIRTABLE_API_URL: &str = "https://api.airtable.com/v0";

/// Client for the Airtable Web API.
///
/// Cheap to clone; the underlying HTTP client and configuration are shared.
/// Every request is routed through the retry executor, so transient rate
/// limits and server errors are absorbed here rather than surfaced to
/// callers.
#[derive(Debug, Clone)]
pub struct AirtableClient {
    http: reqwest::Client,
    config: Arc<ClientConfig>,
}

impl AirtableClient {
    /// Create a new client builder.
    pub fn builder() -> AirtableClientBuilder {
        AirtableClientBuilder::new()
    }

    fn from_config(config: ClientConfig) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&format!("Bearer {}", config.api_key))
                .map_err(|_| AirtableError::Config("invalid API key format".to_string()))?,
        );

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            config: Arc::new(config),
        })
    }

    /// Build a URL by appending percent-encoded path segments to the base.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.config.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| AirtableError::Config("base URL cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Execute one request through the retry executor.
    async fn request<T, B>(
        &self,
        method: Method,
        url: Url,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        with_retry(&self.config.retry_config, || {
            self.send(method.clone(), url.clone(), query, body)
        })
        .await
    }

    /// One attempt: send the request and classify the outcome.
    async fn send<T, B>(
        &self,
        method: Method,
        url: Url,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        debug!(%method, %url, "airtable request");

        let mut request = self.http.request(method, url);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response.json().await?);
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(header::RETRY_AFTER)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.parse().ok());
            return Err(AirtableError::RateLimited { retry_after_secs });
        }

        let body = response.text().await.unwrap_or_default();
        Err(AirtableError::from_response(status.as_u16(), &body))
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        self.request(Method::GET, url, &[], Option::<&()>::None)
            .await
    }

    async fn get_with_query<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, String)],
    ) -> Result<T> {
        self.request(Method::GET, url, query, Option::<&()>::None)
            .await
    }

    async fn post<T, B>(&self, url: Url, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(Method::POST, url, &[], Some(body)).await
    }

    async fn patch<T, B>(&self, url: Url, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(Method::PATCH, url, &[], Some(body)).await
    }

    async fn delete<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        self.request(Method::DELETE, url, &[], Option::<&()>::None)
            .await
    }

    /// List all bases the token can access.
    pub async fn list_bases(&self) -> Result<Vec<Base>> {
        let url = self.endpoint(&["meta", "bases"])?;
        let response: ListBasesResponse = self.get(url).await?;
        Ok(response.bases)
    }

    /// List the tables of a base, including their fields and views.
    pub async fn list_tables(&self, base_id: &str) -> Result<Vec<Table>> {
        let url = self.endpoint(&["meta", "bases", base_id, "tables"])?;
        let response: ListTablesResponse = self.get(url).await?;
        Ok(response.tables)
    }

    /// Create a table in a base.
    pub async fn create_table(&self, base_id: &str, table: &CreateTableRequest) -> Result<Table> {
        let url = self.endpoint(&["meta", "bases", base_id, "tables"])?;
        self.post(url, table).await
    }

    /// Update a table's name or description.
    pub async fn update_table(
        &self,
        base_id: &str,
        table_id: &str,
        updates: &UpdateTableRequest,
    ) -> Result<Table> {
        let url = self.endpoint(&["meta", "bases", base_id, "tables", table_id])?;
        self.patch(url, updates).await
    }

    /// Create a field in a table.
    pub async fn create_field(
        &self,
        base_id: &str,
        table_id: &str,
        field: &FieldSpec,
    ) -> Result<Field> {
        let url = self.endpoint(&["meta", "bases", base_id, "tables", table_id, "fields"])?;
        self.post(url, field).await
    }

    /// Update a field in a table.
    pub async fn update_field(
        &self,
        base_id: &str,
        table_id: &str,
        field_id: &str,
        updates: &FieldUpdate,
    ) -> Result<Field> {
        let url = self.endpoint(&[
            "meta", "bases", base_id, "tables", table_id, "fields", field_id,
        ])?;
        self.patch(url, updates).await
    }

    /// List records in a table, optionally capped at `max_records`.
    pub async fn list_records(
        &self,
        base_id: &str,
        table_name: &str,
        max_records: Option<u32>,
    ) -> Result<Vec<Record>> {
        let url = self.endpoint(&[base_id, table_name])?;
        let query = match max_records {
            Some(max) if max > 0 => vec![("maxRecords", max.to_string())],
            _ => vec![],
        };
        let response: ListRecordsResponse = self.get_with_query(url, &query).await?;
        Ok(response.records)
    }

    /// Search records where `field_name` equals `value`.
    pub async fn search_records(
        &self,
        base_id: &str,
        table_name: &str,
        field_name: &str,
        value: &str,
    ) -> Result<Vec<Record>> {
        let url = self.endpoint(&[base_id, table_name])?;
        let formula = format!("{{{field_name}}} = \"{value}\"");
        let response: ListRecordsResponse = self
            .get_with_query(url, &[("filterByFormula", formula)])
            .await?;
        Ok(response.records)
    }

    /// Create a record in a table.
    pub async fn create_record(
        &self,
        base_id: &str,
        table_name: &str,
        fields: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<Record> {
        let url = self.endpoint(&[base_id, table_name])?;
        self.post(url, &serde_json::json!({ "fields": fields })).await
    }

    /// Update fields of an existing record.
    pub async fn update_record(
        &self,
        base_id: &str,
        table_name: &str,
        record_id: &str,
        fields: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<Record> {
        let url = self.endpoint(&[base_id, table_name, record_id])?;
        self.patch(url, &serde_json::json!({ "fields": fields })).await
    }

    /// Delete a record.
    pub async fn delete_record(
        &self,
        base_id: &str,
        table_name: &str,
        record_id: &str,
    ) -> Result<DeletedRecord> {
        let url = self.endpoint(&[base_id, table_name, record_id])?;
        self.delete(url).await
    }

    /// Fetch a single record by id.
    pub async fn get_record(
        &self,
        base_id: &str,
        table_name: &str,
        record_id: &str,
    ) -> Result<Record> {
        let url = self.endpoint(&[base_id, table_name, record_id])?;
        self.get(url).await
    }
}

/// Builder for creating an [`AirtableClient`].
pub struct AirtableClientBuilder {
    base_url: String,
    api_key: Option<String>,
    timeout: Duration,
    retry_config: RetryConfig,
}

impl AirtableClientBuilder {
    /// Create a new builder targeting the production API.
    pub fn new() -> Self {
        Self {
            base_url: AIRTABLE_API_URL.to_string(),
            api_key: None,
            timeout: Duration::from_secs(30),
            retry_config: RetryConfig::default(),
        }
    }

    /// Override the base URL (tests point this at a local mock server).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the personal access token.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the retry configuration.
    pub fn retry_config(mut self, config: RetryConfig) -> Self {
        self.retry_config = config;
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<AirtableClient> {
        let api_key = self
            .api_key
            .filter(|key| !key.is_empty())
            .ok_or_else(|| AirtableError::Config("api_key is required".to_string()))?;

        let config = ClientConfig {
            base_url: Url::parse(&self.base_url)?,
            api_key,
            timeout: self.timeout,
            retry_config: self.retry_config,
        };

        AirtableClient::from_config(config)
    }
}

impl Default for AirtableClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
