// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::config::Config;
use regex::Regex;
use tracing::warn;

/// Decides which containers have their log lines forwarded.
///
/// An explicit name list takes precedence over a pattern. With neither
/// configured every container is forwarded.
#[derive(Debug, Clone)]
pub enum ContainerFilter {
    /// No filtering configured
    All,
    /// Forward only containers whose name is in the list
    Names(Vec<String>),
    /// Forward only containers whose name matches
    Pattern(Regex),
    /// The configured pattern does not compile. Malformed filter
    /// configuration defaults to unfiltered (fail open).
    InvalidPattern(String),
}

impl ContainerFilter {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.include_containers.as_deref(),
            config.include_containers_regex.as_deref(),
        )
    }

    #[must_use]
    pub fn new(names: Option<&str>, pattern: Option<&str>) -> Self {
        if let Some(names) = names.filter(|n| !n.is_empty()) {
            return Self::Names(names.split(',').map(str::to_string).collect());
        }

        match pattern.filter(|p| !p.is_empty()) {
            None => Self::All,
            Some(pattern) => match Regex::new(pattern) {
                Ok(regex) => Self::Pattern(regex),
                Err(e) => {
                    warn!(
                        "SOLR | Invalid container pattern '{}', forwarding all containers: {}",
                        pattern, e
                    );
                    Self::InvalidPattern(pattern.to_string())
                }
            },
        }
    }

    /// Returns true if log lines from `container_name` should be forwarded.
    #[must_use]
    pub fn included(&self, container_name: &str) -> bool {
        match self {
            Self::All | Self::InvalidPattern(_) => true,
            Self::Names(names) => names.iter().any(|name| name == container_name),
            Self::Pattern(regex) => regex.is_match(container_name),
        }
    }
}
