// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Per-container metadata derived from the environment.
//!
//! Tags, extra fields and the decode-JSON flag are each computed the first
//! time a container ID is seen and reused for the rest of the adapter's
//! lifetime. A restarted container gets a new ID and therefore a fresh entry.
//! Entries for containers that have gone away are never evicted.
//!
//! Each lookup starts from a global setting; when the container's own
//! environment carries the same variable it replaces the global value
//! entirely rather than being merged into it.

use crate::config::{self, Config};
use crate::error::EnrichmentError;
use crate::message::Container;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::debug;

pub type Tags = Arc<Vec<String>>;
pub type Fields = Arc<BTreeMap<String, String>>;

/// Number of times each lookup had to be computed (cache misses).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub tags_computed: u64,
    pub fields_computed: u64,
    pub decode_json_computed: u64,
}

#[derive(Debug)]
pub struct MetadataCache {
    global_tags: Option<String>,
    global_fields: Option<String>,
    global_decode_json: Option<String>,
    tags: HashMap<String, Tags>,
    fields: HashMap<String, Result<Fields, EnrichmentError>>,
    decode_json: HashMap<String, bool>,
    stats: CacheStats,
}

impl MetadataCache {
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            global_tags: config.tags.clone(),
            global_fields: config.fields.clone(),
            global_decode_json: config.decode_json_logs.clone(),
            tags: HashMap::new(),
            fields: HashMap::new(),
            decode_json: HashMap::new(),
            stats: CacheStats::default(),
        }
    }

    /// Tags attached to every document from `container`.
    ///
    /// Unlike fields and the decode flag, a repeated `LOGSTASH_TAGS` entry
    /// resolves to the first one.
    pub fn tags(&mut self, container: &Container) -> Tags {
        if let Some(tags) = self.tags.get(&container.id) {
            return Arc::clone(tags);
        }

        let spec = container
            .env_var_first(config::LOGSTASH_TAGS)
            .or(self.global_tags.as_deref())
            .unwrap_or_default();
        let tags = Arc::new(split_tags(spec));

        self.stats.tags_computed += 1;
        debug!("SOLR | Cached tags {:?} for container {}", tags, container.id);
        self.tags.insert(container.id.clone(), Arc::clone(&tags));
        tags
    }

    /// Extra fields merged into every document from `container`.
    ///
    /// A malformed per-container spec is remembered as an error, so it is
    /// reported for every message of that container without being reparsed.
    pub fn fields(&mut self, container: &Container) -> Result<Fields, EnrichmentError> {
        if let Some(fields) = self.fields.get(&container.id) {
            return fields.clone();
        }

        let spec = container
            .env_var(config::LOGSTASH_FIELDS)
            .or(self.global_fields.as_deref())
            .unwrap_or_default();
        let fields = parse_fields(spec).map(Arc::new);

        self.stats.fields_computed += 1;
        debug!("SOLR | Cached fields {:?} for container {}", fields, container.id);
        self.fields.insert(container.id.clone(), fields.clone());
        fields
    }

    /// Whether log lines from `container` should be decoded as JSON.
    pub fn decode_json(&mut self, container: &Container) -> bool {
        if let Some(decode) = self.decode_json.get(&container.id) {
            return *decode;
        }

        let setting = container
            .env_var(config::DECODE_JSON_LOGS)
            .or(self.global_decode_json.as_deref());
        let decode = is_decode_json(setting);

        self.stats.decode_json_computed += 1;
        self.decode_json.insert(container.id.clone(), decode);
        decode
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Number of distinct containers with cached tags.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

/// Splits a comma-separated tag list. An empty spec yields no tags.
#[must_use]
pub fn split_tags(spec: &str) -> Vec<String> {
    if spec.is_empty() {
        return Vec::new();
    }
    spec.split(',').map(str::to_string).collect()
}

/// Parses a comma-separated list of `key=value` pairs.
///
/// Each segment is split on its first `=`, so values may themselves contain `=`.
pub fn parse_fields(spec: &str) -> Result<BTreeMap<String, String>, EnrichmentError> {
    let mut fields = BTreeMap::new();
    if spec.is_empty() {
        return Ok(fields);
    }

    for segment in spec.split(',') {
        let (key, value) =
            segment
                .split_once('=')
                .ok_or_else(|| EnrichmentError::MissingSeparator {
                    segment: segment.to_string(),
                })?;
        fields.insert(key.to_string(), value.to_string());
    }
    Ok(fields)
}

/// Decoding is on unless the setting is exactly `false`.
#[must_use]
pub fn is_decode_json(setting: Option<&str>) -> bool {
    setting != Some("false")
}
