// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Test doubles for the backend and the retry backoff

use async_trait::async_trait;
use solr_log_adapter::config::Config;
use solr_log_adapter::delivery::Backoff;
use solr_log_adapter::enricher::EnrichedDocument;
use solr_log_adapter::error::BackendError;
use solr_log_adapter::message::{Container, LogMessage};
use solr_log_adapter::solr::{UpdateBackend, UpdateRequest};
use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

/// Fails the first `n` writes, then accepts everything
#[derive(Default)]
pub struct ScriptedBackend {
    failures: Mutex<VecDeque<String>>,
    requests: Mutex<Vec<UpdateRequest>>,
}

#[allow(dead_code)]
impl ScriptedBackend {
    pub fn failing(times: usize) -> Arc<Self> {
        Arc::new(Self {
            failures: Mutex::new((0..times).map(|i| format!("forced failure {i}")).collect()),
            ..Default::default()
        })
    }

    pub fn requests(&self) -> Vec<UpdateRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Documents carried by every write attempt, in order
    pub fn documents(&self) -> Vec<EnrichedDocument> {
        self.requests()
            .iter()
            .flat_map(|r| r.add.iter())
            .map(|doc| serde_json::from_str(doc.data.trim_end()).unwrap())
            .collect()
    }
}

#[async_trait]
impl UpdateBackend for ScriptedBackend {
    async fn update(&self, request: &UpdateRequest, commit: bool) -> Result<(), BackendError> {
        assert!(commit, "every write must commit");
        self.requests.lock().unwrap().push(request.clone());
        match self.failures.lock().unwrap().pop_front() {
            Some(message) => Err(BackendError::Other(message)),
            None => Ok(()),
        }
    }
}

/// Records waits instead of sleeping
#[derive(Default)]
pub struct CountingBackoff {
    pub waits: AtomicU32,
}

#[allow(dead_code)]
impl CountingBackoff {
    pub fn count(&self) -> u32 {
        self.waits.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Backoff for CountingBackoff {
    async fn wait(&self, _attempt: u32) {
        self.waits.fetch_add(1, Ordering::SeqCst);
    }
}

pub fn test_config() -> Config {
    Config {
        host_hostname_path: PathBuf::from("/nonexistent/host_hostname"),
        ..Default::default()
    }
}

#[allow(dead_code)]
pub fn container(id: &str, name: &str, env: &[&str]) -> Arc<Container> {
    Arc::new(Container {
        id: id.to_string(),
        name: name.to_string(),
        image: "registry.local/app:1.0".to_string(),
        hostname: id.to_string(),
        env: env.iter().map(|e| (*e).to_string()).collect(),
        labels: HashMap::from([("com.example.team".to_string(), "infra".to_string())]),
    })
}

#[allow(dead_code)]
pub fn message(container: &Arc<Container>, data: &str) -> LogMessage {
    LogMessage::new(Arc::clone(container), "stdout", data)
}
