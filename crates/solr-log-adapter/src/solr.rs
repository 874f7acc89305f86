// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Solr update API client.
//!
//! Documents are written through the JSON update handler with `commit=true`,
//! so each accepted write is immediately durable and searchable.

use crate::config::Config;
use crate::error::{BackendError, ConfigError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

/// One document inside an `add` operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddDocument {
    pub id: i64,
    /// The enriched document as a newline-terminated JSON line
    pub data: String,
}

/// Body of an update request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateRequest {
    pub add: Vec<AddDocument>,
}

impl UpdateRequest {
    #[must_use]
    pub fn add_one(id: i64, data: String) -> Self {
        Self {
            add: vec![AddDocument { id, data }],
        }
    }
}

/// Seconds since the Unix epoch.
///
/// Two documents built within the same second share an ID.
#[must_use]
pub fn document_id() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_secs()).unwrap_or(i64::MAX))
        .unwrap_or_default()
}

/// The write side of the search backend.
#[async_trait]
pub trait UpdateBackend: Send + Sync {
    /// Adds the documents in `request`, committing when `commit` is set.
    async fn update(&self, request: &UpdateRequest, commit: bool) -> Result<(), BackendError>;
}

#[derive(Debug, Deserialize)]
struct UpdateResponse {
    #[serde(rename = "responseHeader")]
    response_header: Option<ResponseHeader>,
}

#[derive(Debug, Deserialize)]
struct ResponseHeader {
    status: i64,
}

#[derive(Debug, Clone)]
pub struct SolrClient {
    client: reqwest::Client,
    update_url: String,
}

impl SolrClient {
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            client,
            update_url: format!("{}/update", config.collection_url()),
        })
    }

    #[must_use]
    pub fn update_url(&self) -> &str {
        &self.update_url
    }
}

#[async_trait]
impl UpdateBackend for SolrClient {
    async fn update(&self, request: &UpdateRequest, commit: bool) -> Result<(), BackendError> {
        let commit = if commit { "true" } else { "false" };
        let resp = self
            .client
            .post(&self.update_url)
            .query(&[("commit", commit), ("wt", "json")])
            .json(request)
            .send()
            .await?;

        let status = resp.status();
        let body = match resp.text().await {
            Ok(body) => body,
            Err(e) => {
                debug!("SOLR | Could not read update response body: {}", e);
                String::new()
            }
        };
        if !status.is_success() {
            return Err(BackendError::Status { status, body });
        }

        // Solr reports handler failures in the response header even on some 200s.
        match serde_json::from_str::<UpdateResponse>(&body) {
            Ok(UpdateResponse {
                response_header: Some(ResponseHeader { status }),
            }) if status != 0 => Err(BackendError::Solr { status }),
            Ok(_) => Ok(()),
            Err(e) => {
                debug!("SOLR | Ignoring unparsable update response: {}", e);
                Ok(())
            }
        }
    }
}
