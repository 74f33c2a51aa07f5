// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Index lifecycle against the search engine
//!
//! Creating an index is idempotent from the caller's point of view: an index
//! that already exists counts as success.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::error::{Result, StorageError};

/// Timeout for connecting to the search engine
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeout for a whole request
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Error type reported by the engine when creating an index that exists
const ALREADY_EXISTS: &str = "resource_already_exists_exception";

#[async_trait]
pub trait IndexLifecycle: Send + Sync {
    /// Create `index` with `mapping` unless it already exists
    async fn ensure_index(&self, mapping: &str, index: &str) -> Result<()>;
}

/// Classify the engine's answer to an index creation request
pub fn check_create_index_response(index: &str, status: u16, body: &str) -> Result<()> {
    if (200..300).contains(&status) {
        info!(index, "Created index");
        return Ok(());
    }
    if body.contains(ALREADY_EXISTS) {
        warn!(index, "Index already exists");
        return Ok(());
    }
    Err(StorageError::Index {
        index: index.to_string(),
        status,
        body: body.to_string(),
    })
}

/// HTTP client for an Elasticsearch-compatible endpoint
#[derive(Debug, Clone)]
pub struct ElasticsearchClient {
    http: reqwest::Client,
    endpoint: String,
}

impl ElasticsearchClient {
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self::with_client(http, endpoint))
    }

    /// Use a preconfigured HTTP client (auth, TLS, proxies)
    pub fn with_client(http: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl IndexLifecycle for ElasticsearchClient {
    async fn ensure_index(&self, mapping: &str, index: &str) -> Result<()> {
        let url = format!("{}/{}", self.endpoint, index);
        let response = self
            .http
            .put(&url)
            .header(CONTENT_TYPE, "application/json")
            .body(mapping.to_string())
            .send()
            .await
            .map_err(|e| {
                error!(index, error = %e, "Error getting response");
                StorageError::from(e)
            })?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        check_create_index_response(index, status, &body)
    }
}
