// ABOUTME: HTTP backend speaking PostgREST conventions to the hosted database
// ABOUTME: Sends apikey/bearer headers, renders query filters, surfaces error messages verbatim
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Gymtrack Contributors

use super::http_client::shared_client;
use super::{AuthToken, Backend, Query};
use crate::constants::endpoints::REST_PREFIX;
use crate::errors::{AppError, AppResult};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument, warn};
use url::Url;

/// Error body returned by the data API
#[derive(Debug, Deserialize)]
struct RestErrorBody {
    message: Option<String>,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    details: Option<String>,
    #[serde(default)]
    hint: Option<String>,
}

/// Backend reaching the hosted data API over HTTPS
pub struct RestBackend {
    base_url: Url,
    anon_key: String,
    client: Client,
    token: AuthToken,
}

impl RestBackend {
    /// Create a backend for the project at `base_url`
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `base_url` is not a valid URL
    pub fn new(base_url: &str, anon_key: impl Into<String>, token: AuthToken) -> AppResult<Self> {
        Ok(Self {
            base_url: normalize_base_url(base_url)?,
            anon_key: anon_key.into(),
            client: shared_client().clone(),
            token,
        })
    }

    /// Use a specific HTTP client instead of the shared one
    #[must_use]
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    fn collection_url(&self, collection: &str) -> AppResult<Url> {
        let path = format!("{}/{collection}", REST_PREFIX.trim_start_matches('/'));
        self.base_url
            .join(&path)
            .map_err(|e| AppError::config(format!("Invalid collection URL for {collection}: {e}")))
    }

    async fn request(&self, method: Method, collection: &str) -> AppResult<RequestBuilder> {
        let url = self.collection_url(collection)?;
        let bearer = self
            .token
            .get()
            .await
            .unwrap_or_else(|| self.anon_key.clone());
        Ok(self
            .client
            .request(method, url)
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer))
    }

    async fn send(&self, builder: RequestBuilder, collection: &str) -> AppResult<Vec<Value>> {
        let response = builder.send().await.map_err(|e| {
            AppError::unavailable(format!("Request to {collection} failed: {e}"))
                .with_collection(collection)
                .with_source(e)
        })?;
        read_rows(response, collection).await
    }
}

/// Ensure the base URL ends with `/` so joins append instead of replacing
fn normalize_base_url(base_url: &str) -> AppResult<Url> {
    let trimmed = base_url.trim();
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_owned()
    } else {
        format!("{trimmed}/")
    };
    Url::parse(&with_slash).map_err(|e| AppError::config(format!("Invalid backend URL: {e}")))
}

async fn read_rows(response: Response, collection: &str) -> AppResult<Vec<Value>> {
    let status = response.status();
    let text = response.text().await.map_err(|e| {
        AppError::unavailable(format!("Failed to read {collection} response: {e}"))
            .with_collection(collection)
    })?;

    if !status.is_success() {
        let message = error_message(&text).unwrap_or_else(|| format!("HTTP {status}"));
        warn!(collection, status = status.as_u16(), %message, "Backend request failed");
        return Err(AppError::backend(status.as_u16(), message).with_collection(collection));
    }

    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    match serde_json::from_str::<Value>(&text)? {
        Value::Array(rows) => Ok(rows),
        Value::Null => Ok(Vec::new()),
        row @ Value::Object(_) => Ok(vec![row]),
        other => Err(AppError::serialization(format!(
            "Unexpected {collection} response: {other}"
        ))),
    }
}

/// Extract the backend's own message, unchanged
pub(crate) fn error_message(body: &str) -> Option<String> {
    let parsed: RestErrorBody = serde_json::from_str(body).ok()?;
    debug!(
        code = parsed.code.as_deref().unwrap_or(""),
        details = parsed.details.as_deref().unwrap_or(""),
        hint = parsed.hint.as_deref().unwrap_or(""),
        "Backend error body"
    );
    parsed.message
}

#[async_trait]
impl Backend for RestBackend {
    fn name(&self) -> &'static str {
        "rest"
    }

    #[instrument(skip(self, query), fields(collection = %query.collection))]
    async fn select(&self, query: &Query) -> AppResult<Vec<Value>> {
        let builder = self
            .request(Method::GET, &query.collection)
            .await?
            .query(&query.select_params());
        self.send(builder, &query.collection).await
    }

    #[instrument(skip(self, rows), fields(collection = %collection, rows = rows.len()))]
    async fn insert(&self, collection: &str, rows: Vec<Value>) -> AppResult<Vec<Value>> {
        let builder = self
            .request(Method::POST, collection)
            .await?
            .header("Prefer", "return=representation")
            .json(&rows);
        self.send(builder, collection).await
    }

    #[instrument(skip(self, query, patch), fields(collection = %query.collection))]
    async fn update(&self, query: &Query, patch: Value) -> AppResult<Vec<Value>> {
        let builder = self
            .request(Method::PATCH, &query.collection)
            .await?
            .header("Prefer", "return=representation")
            .query(&query.filter_params())
            .json(&patch);
        self.send(builder, &query.collection).await
    }

    #[instrument(skip(self, query), fields(collection = %query.collection))]
    async fn delete(&self, query: &Query) -> AppResult<Vec<Value>> {
        let builder = self
            .request(Method::DELETE, &query.collection)
            .await?
            .header("Prefer", "return=representation")
            .query(&query.filter_params());
        self.send(builder, &query.collection).await
    }
}
