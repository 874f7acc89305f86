// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Forwards container log lines to a Solr collection.
//!
//! The host log router hands the adapter a stream of [`message::LogMessage`]s.
//! For each one the adapter decides whether the container is included,
//! looks up the container's cached tags and fields, builds a JSON document
//! and writes it to Solr with an immediate commit, retrying failed writes
//! when `RETRY_SEND` is set.
//!
//! ```rust,ignore
//! use solr_log_adapter::{adapter::SolrAdapter, config::Config};
//!
//! let adapter = SolrAdapter::new(Config::from_env()?)?;
//! adapter.stream_or_exit(logstream).await;
//! ```

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

pub mod adapter;
pub mod config;
pub mod delivery;
pub mod enricher;
pub mod error;
pub mod filter;
pub mod logger;
pub mod message;
pub mod metadata;
pub mod solr;
