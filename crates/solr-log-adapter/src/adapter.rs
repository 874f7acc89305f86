// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! The consumption loop tying the pipeline together.
//!
//! Each message flows through the stages below before the next one is
//! received:
//!
//! ```text
//!   LogMessage ──> ContainerFilter ──> MetadataCache ──> enrich ──> DeliveryEngine
//!                      │ (excluded)
//!                      v
//!                   skipped
//! ```

use crate::config::Config;
use crate::delivery::{Backoff, DeliveryEngine, DeliveryOutcome, FixedBackoff};
use crate::enricher::{enrich, read_host_hostname, ContainerIdentity};
use crate::error::{AdapterError, ConfigError, DeliveryError};
use crate::filter::ContainerFilter;
use crate::message::LogMessage;
use crate::metadata::{CacheStats, MetadataCache};
use crate::solr::{SolrClient, UpdateBackend};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

/// Counters describing what the adapter did with the messages it received.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AdapterStats {
    pub received: u64,
    pub filtered: u64,
    pub delivered: u64,
    pub abandoned: u64,
    pub retries: u64,
}

/// What happened to a single message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handled {
    /// The container is not included
    Filtered,
    Delivered,
    /// Dropped whole: broken per-container fields or unencodable document
    Abandoned,
}

pub struct SolrAdapter {
    config: Config,
    filter: ContainerFilter,
    cache: MetadataCache,
    engine: DeliveryEngine,
    stats: AdapterStats,
}

impl SolrAdapter {
    /// Creates an adapter writing to the Solr collection named in `config`.
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        config.validate()?;
        let backend = Arc::new(SolrClient::new(&config)?);
        info!(
            "SOLR | Forwarding logs to {}",
            backend.update_url()
        );
        Ok(Self::with_backend(
            config,
            backend,
            Arc::new(FixedBackoff::default()),
        ))
    }

    /// Creates an adapter with an explicit backend and retry backoff.
    #[must_use]
    pub fn with_backend(
        config: Config,
        backend: Arc<dyn UpdateBackend>,
        backoff: Arc<dyn Backoff>,
    ) -> Self {
        let filter = ContainerFilter::from_config(&config);
        let cache = MetadataCache::new(&config);
        let engine = DeliveryEngine::new(backend, backoff, config.retry_send);

        Self {
            config,
            filter,
            cache,
            engine,
            stats: AdapterStats::default(),
        }
    }

    /// Filters, enriches and delivers one message.
    ///
    /// Returns an error only when a write fails and retrying is disabled.
    pub async fn handle(&mut self, message: &LogMessage) -> Result<Handled, DeliveryError> {
        self.stats.received += 1;
        let container = &message.container;

        if !self.filter.included(&container.name) {
            self.stats.filtered += 1;
            return Ok(Handled::Filtered);
        }

        let tags = self.cache.tags(container);
        let fields = match self.cache.fields(container) {
            Ok(fields) => fields,
            Err(e) => {
                error!(
                    "SOLR | Dropping message from container {}: {}",
                    container.name, e
                );
                self.stats.abandoned += 1;
                return Ok(Handled::Abandoned);
            }
        };
        let decode_json = self.cache.decode_json(container);

        // Read per message so an override written after startup is picked up.
        let host_hostname = read_host_hostname(&self.config.host_hostname_path);
        let identity = ContainerIdentity::new(
            container,
            host_hostname.as_deref(),
            self.config.docker_labels,
        );
        let document = enrich(
            &message.data,
            &identity,
            &message.source,
            &tags,
            &fields,
            decode_json,
        );

        match self.engine.deliver(document).await {
            DeliveryOutcome::Delivered { attempts } => {
                self.stats.delivered += 1;
                self.stats.retries += u64::from(attempts.saturating_sub(1));
                Ok(Handled::Delivered)
            }
            DeliveryOutcome::Abandoned(_) => {
                self.stats.abandoned += 1;
                Ok(Handled::Abandoned)
            }
            DeliveryOutcome::Fatal(e) => Err(e),
        }
    }

    /// Consumes `logstream` one message at a time until it closes.
    ///
    /// A write failure with retrying disabled stops the loop and is returned.
    pub async fn stream(
        &mut self,
        mut logstream: mpsc::Receiver<LogMessage>,
    ) -> Result<(), AdapterError> {
        while let Some(message) = logstream.recv().await {
            debug!(
                "SOLR | stream: container={} source={} bytes={}",
                message.container.name,
                message.source,
                message.data.len()
            );
            self.handle(&message).await?;
        }

        debug!("SOLR | Log stream closed: {:?}", self.stats);
        Ok(())
    }

    /// Like [`SolrAdapter::stream`], but terminates the process on a fatal
    /// write failure.
    pub async fn stream_or_exit(mut self, logstream: mpsc::Receiver<LogMessage>) {
        if let Err(e) = self.stream(logstream).await {
            error!("SOLR | Fatal: {}", e);
            std::process::exit(1);
        }
    }

    #[must_use]
    pub fn stats(&self) -> AdapterStats {
        self.stats
    }

    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }
}
