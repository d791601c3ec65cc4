//! Remote document-store API client
//!
//! The remote backend is a document collection API: query by field
//! equality, insert with a generated id, merge-upsert at a caller-chosen
//! id, and partial field update by id. The sync adapter only ever talks to
//! the [`DocumentStore`] trait, so the concrete transport stays swappable.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;

use crate::error::{AppError, AppResult};

/// A document fetched from the remote store
#[derive(Debug, Clone)]
pub struct Document {
    pub id: String,
    pub data: Value,
}

/// Remote document collection operations used by the sync adapter
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// All documents in `collection` whose fields equal every filter value.
    async fn find_where(
        &self,
        collection: &str,
        filters: &[(&str, Value)],
    ) -> AppResult<Vec<Document>>;

    /// Insert a document, returning the server-generated id.
    async fn insert(&self, collection: &str, data: Value) -> AppResult<String>;

    /// Create-or-merge the document at `id`.
    async fn upsert_merge(&self, collection: &str, id: &str, data: Value) -> AppResult<()>;

    /// Partial update of an existing document. Fails with `RemoteNotFound`
    /// when no document exists at `id`.
    async fn update_fields(&self, collection: &str, id: &str, fields: Value) -> AppResult<()>;
}

/// HTTP client for the remote document-store API
#[derive(Debug, Clone)]
pub struct RestDocumentStore {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RestDocument {
    id: String,
    #[serde(flatten)]
    data: Value,
}

#[derive(Debug, Deserialize)]
struct InsertResponse {
    id: String,
}

impl RestDocumentStore {
    pub fn new(base_url: String, api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    fn url(&self, collection: &str) -> String {
        format!("{}/{}", self.base_url, collection)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    /// Query-parameter rendering for filter values
    fn param(value: &Value) -> String {
        match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    async fn check(response: reqwest::Response, context: &str) -> AppResult<reqwest::Response> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(AppError::Remote(format!(
            "{} failed: {} - {}",
            context, status, body
        )))
    }
}

#[async_trait]
impl DocumentStore for RestDocumentStore {
    async fn find_where(
        &self,
        collection: &str,
        filters: &[(&str, Value)],
    ) -> AppResult<Vec<Document>> {
        let query: Vec<(String, String)> = filters
            .iter()
            .map(|(field, value)| (field.to_string(), Self::param(value)))
            .collect();

        let response = self
            .authorize(self.client.get(self.url(collection)).query(&query))
            .send()
            .await?;
        let response = Self::check(response, "remote query").await?;

        let docs: Vec<RestDocument> = response.json().await?;
        Ok(docs
            .into_iter()
            .map(|d| Document {
                id: d.id,
                data: d.data,
            })
            .collect())
    }

    async fn insert(&self, collection: &str, data: Value) -> AppResult<String> {
        let response = self
            .authorize(self.client.post(self.url(collection)).json(&data))
            .send()
            .await?;
        let response = Self::check(response, "remote insert").await?;

        let created: InsertResponse = response.json().await?;
        Ok(created.id)
    }

    async fn upsert_merge(&self, collection: &str, id: &str, data: Value) -> AppResult<()> {
        let url = format!("{}/{}", self.url(collection), id);
        let response = self
            .authorize(self.client.put(&url).query(&[("merge", "true")]).json(&data))
            .send()
            .await?;
        Self::check(response, "remote upsert").await?;
        Ok(())
    }

    async fn update_fields(&self, collection: &str, id: &str, fields: Value) -> AppResult<()> {
        let url = format!("{}/{}", self.url(collection), id);
        let response = self
            .authorize(self.client.patch(&url).json(&fields))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(AppError::RemoteNotFound {
                collection: collection.to_string(),
                key: id.to_string(),
            });
        }
        Self::check(response, "remote update").await?;
        Ok(())
    }
}
