// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Inbound types supplied by the host log router.

use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;

/// Container metadata as reported by the container runtime.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Container {
    pub id: String,
    pub name: String,
    pub image: String,
    pub hostname: String,
    /// Environment in `KEY=VALUE` form, as configured on the container
    pub env: Vec<String>,
    pub labels: HashMap<String, String>,
}

impl Container {
    /// Returns the value of `key` in the container environment.
    ///
    /// The last entry wins when the key is repeated. A present but empty
    /// entry (`KEY=`) is returned as `Some("")`.
    #[must_use]
    pub fn env_var(&self, key: &str) -> Option<&str> {
        self.env
            .iter()
            .rev()
            .find_map(|entry| entry.strip_prefix(key)?.strip_prefix('='))
    }

    /// Like [`Container::env_var`], but the first entry wins.
    #[must_use]
    pub fn env_var_first(&self, key: &str) -> Option<&str> {
        self.env
            .iter()
            .find_map(|entry| entry.strip_prefix(key)?.strip_prefix('='))
    }
}

/// One log line read from a container.
#[derive(Debug, Clone, Deserialize)]
pub struct LogMessage {
    pub container: Arc<Container>,
    /// Stream the line was read from, e.g. `stdout` or `stderr`
    pub source: String,
    /// The raw line, without its trailing newline
    pub data: String,
    #[serde(default)]
    pub time: Option<String>,
}

impl LogMessage {
    #[must_use]
    pub fn new(container: Arc<Container>, source: &str, data: &str) -> Self {
        Self {
            container,
            source: source.to_string(),
            data: data.to_string(),
            time: None,
        }
    }
}
