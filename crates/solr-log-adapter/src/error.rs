// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

/// Errors raised while resolving the adapter configuration.
///
/// These abort adapter construction and are always surfaced to the caller.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: '{value}' is not a valid integer")]
    InvalidNumber { name: &'static str, value: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Malformed field spec in {name}: {source}")]
    MalformedFields {
        name: &'static str,
        #[source]
        source: EnrichmentError,
    },

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Errors raised while deriving per-container metadata.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EnrichmentError {
    #[error("field segment '{segment}' has no '=' separator")]
    MissingSeparator { segment: String },
}

/// The enriched document could not be encoded as JSON.
#[derive(Debug, thiserror::Error)]
#[error("could not marshal JSON: {0}")]
pub struct SerializationError(#[from] pub serde_json::Error);

/// A single write to the backend failed.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("solr reported status {status}")]
    Solr { status: i64 },

    #[error("{0}")]
    Other(String),
}

/// A write failed and retrying is disabled.
#[derive(Debug, thiserror::Error)]
#[error("could not write to solr: {source}")]
pub struct DeliveryError {
    #[from]
    pub source: BackendError,
}

/// Errors that end the consumption loop.
#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    #[error(transparent)]
    Delivery(#[from] DeliveryError),
}
