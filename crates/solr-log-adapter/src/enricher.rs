// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Builds the document sent to Solr from a raw log line.
//!
//! ```text
//!   raw line ──> decoded JSON object  (decode enabled and line is an object)
//!            └─> {"message": raw}     (otherwise)
//!                     │
//!                     v
//!               overlay fields        (may replace decoded keys)
//!                     │
//!                     v
//!          set docker, stream, tags   (always win)
//! ```

use crate::error::SerializationError;
use crate::message::Container;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

pub const MESSAGE_KEY: &str = "message";
pub const DOCKER_KEY: &str = "docker";
pub const STREAM_KEY: &str = "stream";
pub const TAGS_KEY: &str = "tags";

/// The container fields forwarded under the `docker` key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerIdentity {
    pub name: String,
    pub id: String,
    pub image: String,
    pub hostname: String,
    /// Container labels with `.` replaced by `_` in the keys, when label
    /// forwarding is enabled
    pub labels: Option<BTreeMap<String, String>>,
}

impl ContainerIdentity {
    /// `host_hostname` takes precedence over the container's own hostname.
    #[must_use]
    pub fn new(container: &Container, host_hostname: Option<&str>, forward_labels: bool) -> Self {
        let labels = forward_labels.then(|| {
            container
                .labels
                .iter()
                .map(|(label, value)| (label.replace('.', "_"), value.clone()))
                .collect()
        });

        Self {
            name: container.name.clone(),
            id: container.id.clone(),
            image: container.image.clone(),
            hostname: host_hostname.unwrap_or(&container.hostname).to_string(),
            labels,
        }
    }
}

impl From<&ContainerIdentity> for Value {
    fn from(identity: &ContainerIdentity) -> Self {
        let mut map = Map::new();
        map.insert("name".to_string(), Value::from(identity.name.as_str()));
        map.insert("id".to_string(), Value::from(identity.id.as_str()));
        map.insert("image".to_string(), Value::from(identity.image.as_str()));
        map.insert("hostname".to_string(), Value::from(identity.hostname.as_str()));
        let labels = match &identity.labels {
            Some(labels) => Value::Object(
                labels
                    .iter()
                    .map(|(k, v)| (k.clone(), Value::from(v.as_str())))
                    .collect(),
            ),
            None => Value::Null,
        };
        map.insert("labels".to_string(), labels);
        Value::Object(map)
    }
}

/// Reads the host-level hostname override.
///
/// Returns `None` when the file is missing, unreadable or empty once
/// surrounding CR/LF are trimmed.
#[must_use]
pub fn read_host_hostname(path: &Path) -> Option<String> {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            let hostname = content.trim_matches(|c| c == '\r' || c == '\n');
            (!hostname.is_empty()).then(|| hostname.to_string())
        }
        Err(e) => {
            debug!(
                "SOLR | No host hostname override at {}: {}",
                path.display(),
                e
            );
            None
        }
    }
}

/// A log line ready to be delivered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnrichedDocument(Map<String, Value>);

impl EnrichedDocument {
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    /// Encodes the document as one newline-terminated JSON line.
    pub fn to_line(&self) -> Result<String, SerializationError> {
        let mut line = serde_json::to_string(&self.0)?;
        line.push('\n');
        Ok(line)
    }
}

impl From<Map<String, Value>> for EnrichedDocument {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Builds the document for one log line. Never fails.
#[must_use]
pub fn enrich(
    raw: &str,
    identity: &ContainerIdentity,
    stream: &str,
    tags: &[String],
    fields: &BTreeMap<String, String>,
    decode_json: bool,
) -> EnrichedDocument {
    let mut data = decode_json
        .then(|| decode_object(raw))
        .flatten()
        .unwrap_or_else(|| {
            let mut map = Map::new();
            map.insert(MESSAGE_KEY.to_string(), Value::from(raw));
            map
        });

    for (key, value) in fields {
        data.insert(key.clone(), Value::from(value.as_str()));
    }

    data.insert(DOCKER_KEY.to_string(), Value::from(identity));
    data.insert(STREAM_KEY.to_string(), Value::from(stream));
    data.insert(
        TAGS_KEY.to_string(),
        Value::Array(tags.iter().map(|t| Value::from(t.as_str())).collect()),
    );

    EnrichedDocument(data)
}

// Only JSON objects seed the document; arrays, scalars and `null` fall back to `message`.
fn decode_object(raw: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}
