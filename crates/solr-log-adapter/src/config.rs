// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::error::ConfigError;
use crate::metadata::parse_fields;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const SOLR_HOSTNAME: &str = "SOLR_HOSTNAME";
pub const SOLR_PORT: &str = "SOLR_PORT";
pub const SOLR_COLLECTIONNAME: &str = "SOLR_COLLECTIONNAME";
pub const SOLR_SCHEME: &str = "SOLR_SCHEME";
pub const SOLR_TIMEOUT: &str = "SOLR_TIMEOUT";
pub const LOGSTASH_TAGS: &str = "LOGSTASH_TAGS";
pub const LOGSTASH_FIELDS: &str = "LOGSTASH_FIELDS";
pub const DECODE_JSON_LOGS: &str = "DECODE_JSON_LOGS";
pub const DOCKER_LABELS: &str = "DOCKER_LABELS";
pub const INCLUDE_CONTAINERS: &str = "INCLUDE_CONTAINERS";
pub const INCLUDE_CONTAINERS_REGEX: &str = "INCLUDE_CONTAINERS_REGEX";
pub const RETRY_SEND: &str = "RETRY_SEND";
pub const HOST_HOSTNAME_PATH: &str = "HOST_HOSTNAME_PATH";
pub const SOLR_ADAPTER_LOG_LEVEL: &str = "SOLR_ADAPTER_LOG_LEVEL";

const DEFAULT_SOLR_HOSTNAME: &str = "localhost";
const DEFAULT_SOLR_PORT: u16 = 8983;
const DEFAULT_SOLR_COLLECTION: &str = "collection1";
const DEFAULT_SOLR_SCHEME: &str = "http";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_HOST_HOSTNAME_PATH: &str = "/etc/host_hostname";
const DEFAULT_LOG_LEVEL: &str = "info";

const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Adapter configuration resolved from environment-style settings.
///
/// Every setting is optional. A setting that is present but empty is treated
/// the same as an absent one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Solr host name
    pub solr_hostname: String,
    /// Solr port
    pub solr_port: u16,
    /// Solr collection (core) receiving the documents
    pub solr_collection: String,
    /// `http` or `https`
    pub solr_scheme: String,
    /// Timeout applied to every update request
    pub request_timeout: Duration,
    /// Global comma-separated tag list, overridable per container
    pub tags: Option<String>,
    /// Global comma-separated `key=value` list, overridable per container
    pub fields: Option<String>,
    /// Global decode-JSON setting, overridable per container
    pub decode_json_logs: Option<String>,
    /// Forward container labels under `docker.labels`
    pub docker_labels: bool,
    /// Comma-separated list of container names to forward
    pub include_containers: Option<String>,
    /// Regular expression matched against container names
    pub include_containers_regex: Option<String>,
    /// Retry failed writes forever instead of terminating
    pub retry_send: bool,
    /// File whose content overrides the container hostname
    pub host_hostname_path: PathBuf,
    /// Log level for the adapter's own logs
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            solr_hostname: DEFAULT_SOLR_HOSTNAME.to_string(),
            solr_port: DEFAULT_SOLR_PORT,
            solr_collection: DEFAULT_SOLR_COLLECTION.to_string(),
            solr_scheme: DEFAULT_SOLR_SCHEME.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            tags: None,
            fields: None,
            decode_json_logs: None,
            docker_labels: false,
            include_containers: None,
            include_containers_regex: None,
            retry_send: false,
            host_hostname_path: PathBuf::from(DEFAULT_HOST_HOSTNAME_PATH),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl Config {
    /// Create configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Create configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.is_empty());

        let solr_port = match get(SOLR_PORT) {
            Some(port) => parse_number::<u16>(SOLR_PORT, &port)?,
            None => DEFAULT_SOLR_PORT,
        };
        let request_timeout = match get(SOLR_TIMEOUT) {
            Some(secs) => Duration::from_secs(parse_number::<u64>(SOLR_TIMEOUT, &secs)?),
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        let config = Self {
            solr_hostname: get(SOLR_HOSTNAME).unwrap_or_else(|| DEFAULT_SOLR_HOSTNAME.to_string()),
            solr_port,
            solr_collection: get(SOLR_COLLECTIONNAME)
                .unwrap_or_else(|| DEFAULT_SOLR_COLLECTION.to_string()),
            solr_scheme: get(SOLR_SCHEME)
                .map(|scheme| scheme.to_lowercase())
                .unwrap_or_else(|| DEFAULT_SOLR_SCHEME.to_string()),
            request_timeout,
            tags: get(LOGSTASH_TAGS),
            fields: get(LOGSTASH_FIELDS),
            decode_json_logs: get(DECODE_JSON_LOGS),
            docker_labels: get(DOCKER_LABELS).is_some(),
            include_containers: get(INCLUDE_CONTAINERS),
            include_containers_regex: get(INCLUDE_CONTAINERS_REGEX),
            retry_send: get(RETRY_SEND).is_some(),
            host_hostname_path: get(HOST_HOSTNAME_PATH)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_HOST_HOSTNAME_PATH)),
            log_level: get(SOLR_ADAPTER_LOG_LEVEL)
                .map(|level| level.to_lowercase())
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.solr_port == 0 {
            return Err(ConfigError::Invalid(
                "SOLR_PORT must be greater than 0".to_string(),
            ));
        }

        if self.solr_hostname.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "SOLR_HOSTNAME cannot be empty".to_string(),
            ));
        }

        if self.solr_scheme != "http" && self.solr_scheme != "https" {
            return Err(ConfigError::Invalid(format!(
                "Invalid scheme '{}'. Must be one of: http, https",
                self.solr_scheme
            )));
        }

        if !VALID_LOG_LEVELS.contains(&self.log_level.as_str()) {
            return Err(ConfigError::Invalid(format!(
                "Invalid log level '{}'. Must be one of: trace, debug, info, warn, error",
                self.log_level
            )));
        }

        // Per-container overrides are only checked when first looked up.
        if let Some(fields) = &self.fields {
            parse_fields(fields).map_err(|source| ConfigError::MalformedFields {
                name: LOGSTASH_FIELDS,
                source,
            })?;
        }

        Ok(())
    }

    /// Base URL of the configured collection, e.g. `http://localhost:8983/solr/collection1`
    #[must_use]
    pub fn collection_url(&self) -> String {
        format!(
            "{}://{}:{}/solr/{}",
            self.solr_scheme, self.solr_hostname, self.solr_port, self.solr_collection
        )
    }
}

fn parse_number<T: std::str::FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value.parse::<T>().map_err(|_| ConfigError::InvalidNumber {
        name,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.solr_hostname, "localhost");
        assert_eq!(config.solr_port, 8983);
        assert_eq!(config.solr_collection, "collection1");
        assert!(!config.retry_send);
        assert!(!config.docker_labels);
        assert_eq!(config.collection_url(), "http://localhost:8983/solr/collection1");
    }

    #[test]
    fn test_custom_backend() {
        let config = config_from(&[
            (SOLR_HOSTNAME, "solr.internal"),
            (SOLR_PORT, "18983"),
            (SOLR_COLLECTIONNAME, "logs"),
            (SOLR_SCHEME, "HTTPS"),
        ])
        .unwrap();
        assert_eq!(config.collection_url(), "https://solr.internal:18983/solr/logs");
    }

    #[test]
    fn test_empty_values_fall_back_to_defaults() {
        let config = config_from(&[
            (SOLR_HOSTNAME, ""),
            (SOLR_PORT, ""),
            (SOLR_COLLECTIONNAME, ""),
            (RETRY_SEND, ""),
            (LOGSTASH_TAGS, ""),
        ])
        .unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_invalid_port_is_an_error() {
        let err = config_from(&[(SOLR_PORT, "not-a-port")]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidNumber { name: SOLR_PORT, .. }
        ));

        assert!(config_from(&[(SOLR_PORT, "99999")]).is_err());
        assert!(config_from(&[(SOLR_PORT, " 8983")]).is_err());
        assert!(config_from(&[(SOLR_PORT, "8983\n")]).is_err());
        assert!(config_from(&[(SOLR_PORT, "0")]).is_err());
    }

    #[test]
    fn test_invalid_timeout_is_an_error() {
        assert!(config_from(&[(SOLR_TIMEOUT, "soon")]).is_err());
        let config = config_from(&[(SOLR_TIMEOUT, "3")]).unwrap();
        assert_eq!(config.request_timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_toggles_are_enabled_by_any_non_empty_value() {
        let config = config_from(&[(RETRY_SEND, "false"), (DOCKER_LABELS, "0")]).unwrap();
        assert!(config.retry_send);
        assert!(config.docker_labels);
    }

    #[test]
    fn test_validate_rejects_malformed_global_fields() {
        let err = config_from(&[(LOGSTASH_FIELDS, "team=infra,oops")]).unwrap_err();
        assert!(matches!(err, ConfigError::MalformedFields { .. }));

        let config = config_from(&[(LOGSTASH_FIELDS, "team=infra,env=prod")]).unwrap();
        assert_eq!(config.fields.as_deref(), Some("team=infra,env=prod"));
    }

    #[test]
    fn test_validate_invalid_scheme() {
        let config = Config {
            solr_scheme: "ftp".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_valid_log_levels() {
        for level in VALID_LOG_LEVELS {
            let config = Config {
                log_level: level.to_string(),
                ..Default::default()
            };
            assert!(
                config.validate().is_ok(),
                "Log level '{}' should be valid",
                level
            );
        }

        let config = Config {
            log_level: "verbose".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    #[serial]
    fn test_from_env() {
        env::set_var(SOLR_HOSTNAME, "env-host");
        env::set_var(SOLR_PORT, "8984");
        env::set_var(INCLUDE_CONTAINERS, "web,worker");
        let config = Config::from_env().unwrap();
        assert_eq!(config.solr_hostname, "env-host");
        assert_eq!(config.solr_port, 8984);
        assert_eq!(config.include_containers.as_deref(), Some("web,worker"));
        env::remove_var(SOLR_HOSTNAME);
        env::remove_var(SOLR_PORT);
        env::remove_var(INCLUDE_CONTAINERS);
    }

    #[test]
    #[serial]
    fn test_from_env_invalid_port() {
        env::set_var(SOLR_PORT, "eighty");
        let config = Config::from_env();
        assert!(config.is_err());
        env::remove_var(SOLR_PORT);
    }
}
