// ABOUTME: Row-level data access abstraction over the hosted relational backend
// ABOUTME: Backend trait with REST and in-memory implementations plus typed helpers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Gymtrack Contributors

//! # Backend Access
//!
//! All persistent state lives in a hosted database exposed as a row-level CRUD
//! API over named collections. The [`Backend`] trait is that API: select,
//! insert, update and delete against a [`Query`], exchanging JSON rows.
//!
//! - [`RestBackend`] talks to the hosted service over HTTP (PostgREST conventions)
//! - [`MemoryBackend`] keeps rows in process, used by tests and the offline demo
//!
//! [`BackendExt`] layers typed (de)serialization on top so the managers in
//! `crate::database` work with model types only.

/// Shared HTTP client for backend and identity calls
pub mod http_client;
/// In-process backend
pub mod memory;
/// Query builder
pub mod query;
/// HTTP backend
pub mod rest;

pub use memory::{MemoryBackend, Operation};
pub use query::{Filter, FilterOp, Order, Query};
pub use rest::RestBackend;

use crate::errors::{AppError, AppResult};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Row-level CRUD against named collections
#[async_trait]
pub trait Backend: Send + Sync {
    /// Backend name for logs
    fn name(&self) -> &'static str;

    /// Rows matching the query, ordered and limited as requested
    async fn select(&self, query: &Query) -> AppResult<Vec<Value>>;

    /// Insert rows and return them as stored (with generated ids)
    async fn insert(&self, collection: &str, rows: Vec<Value>) -> AppResult<Vec<Value>>;

    /// Merge `patch` into every matching row and return the updated rows
    async fn update(&self, query: &Query, patch: Value) -> AppResult<Vec<Value>>;

    /// Delete matching rows and return them
    async fn delete(&self, query: &Query) -> AppResult<Vec<Value>>;
}

/// Typed helpers over any [`Backend`]
#[async_trait]
pub trait BackendExt: Backend {
    /// Select and deserialize every matching row
    async fn fetch<T>(&self, query: &Query) -> AppResult<Vec<T>>
    where
        T: DeserializeOwned + Send,
    {
        if query.matches_nothing() {
            return Ok(Vec::new());
        }
        self.select(query)
            .await?
            .into_iter()
            .map(|row| decode(&query.collection, row))
            .collect()
    }

    /// Select the first matching row, if any
    async fn fetch_optional<T>(&self, query: &Query) -> AppResult<Option<T>>
    where
        T: DeserializeOwned + Send,
    {
        let limited = query.clone().limit(1);
        Ok(self.fetch(&limited).await?.into_iter().next())
    }

    /// Select exactly one row or fail with `ResourceNotFound`
    async fn fetch_one<T>(&self, query: &Query, what: &str) -> AppResult<T>
    where
        T: DeserializeOwned + Send,
    {
        self.fetch_optional(query)
            .await?
            .ok_or_else(|| AppError::not_found(what).with_collection(query.collection.clone()))
    }

    /// Insert one payload and return the stored row
    async fn insert_one<P, T>(&self, collection: &str, payload: &P) -> AppResult<T>
    where
        P: Serialize + Sync,
        T: DeserializeOwned + Send,
    {
        let row = serde_json::to_value(payload)?;
        let stored = self.insert(collection, vec![row]).await?;
        let first = stored.into_iter().next().ok_or_else(|| {
            AppError::internal("Backend returned no row for insert").with_collection(collection)
        })?;
        decode(collection, first)
    }

    /// Insert several payloads and return the stored rows
    async fn insert_many<P, T>(&self, collection: &str, payloads: &[P]) -> AppResult<Vec<T>>
    where
        P: Serialize + Sync,
        T: DeserializeOwned + Send,
    {
        if payloads.is_empty() {
            return Ok(Vec::new());
        }
        let rows = payloads
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()?;
        self.insert(collection, rows)
            .await?
            .into_iter()
            .map(|row| decode(collection, row))
            .collect()
    }

    /// Apply a patch and return the updated rows
    async fn patch<P, T>(&self, query: &Query, patch: &P) -> AppResult<Vec<T>>
    where
        P: Serialize + Sync,
        T: DeserializeOwned + Send,
    {
        let value = serde_json::to_value(patch)?;
        self.update(query, value)
            .await?
            .into_iter()
            .map(|row| decode(&query.collection, row))
            .collect()
    }

    /// Apply a patch expected to hit exactly one row
    async fn patch_one<P, T>(&self, query: &Query, patch: &P, what: &str) -> AppResult<T>
    where
        P: Serialize + Sync,
        T: DeserializeOwned + Send,
    {
        self.patch(query, patch)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::not_found(what).with_collection(query.collection.clone()))
    }
}

impl<B: Backend + ?Sized> BackendExt for B {}

fn decode<T: DeserializeOwned>(collection: &str, row: Value) -> AppResult<T> {
    serde_json::from_value(row).map_err(|e| {
        AppError::serialization(format!("Unexpected {collection} row: {e}")).with_collection(collection)
    })
}

/// Bearer token shared between the identity layer (writer) and HTTP backends (readers)
///
/// When empty, requests fall back to the anonymous key.
#[derive(Debug, Clone, Default)]
pub struct AuthToken {
    inner: Arc<RwLock<Option<String>>>,
}

impl AuthToken {
    /// Create an empty token slot
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current access token
    pub async fn set(&self, token: Option<String>) {
        *self.inner.write().await = token;
    }

    /// Current access token, if signed in
    pub async fn get(&self) -> Option<String> {
        self.inner.read().await.clone()
    }
}

/// Shared handle to whichever backend the client was configured with
pub type SharedBackend = Arc<dyn Backend>;
