// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Reliable delivery of a single document.
//!
//! Delivery is a small state machine advanced one transition at a time by
//! [`DeliveryEngine::step`]:
//!
//! ```text
//!   Serializing ──(encode error)──> Abandoned
//!        │
//!        v
//!   Delivering ──(ok)──> Done
//!        │  ^
//!  (error)  └──────────┐
//!        v             │
//!   retry enabled? ──yes──> Retrying ──(backoff)──┘
//!        │
//!        no
//!        v
//!      Fatal
//! ```
//!
//! There is no retry limit. While a document is retrying no other message
//! is consumed, which keeps delivery ordered at the cost of stalling the
//! stream during a backend outage.

use crate::enricher::EnrichedDocument;
use crate::error::{DeliveryError, SerializationError};
use crate::solr::{document_id, UpdateBackend, UpdateRequest};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

/// Pause between two attempts to write the same document.
pub const RETRY_BACKOFF: Duration = Duration::from_secs(2);

/// Waits between delivery attempts.
#[async_trait]
pub trait Backoff: Send + Sync {
    /// Called after failed attempt number `attempt` (starting at 1).
    async fn wait(&self, attempt: u32);
}

/// Sleeps for the same duration after every failure.
#[derive(Debug, Clone, Copy)]
pub struct FixedBackoff(pub Duration);

impl Default for FixedBackoff {
    fn default() -> Self {
        Self(RETRY_BACKOFF)
    }
}

#[async_trait]
impl Backoff for FixedBackoff {
    async fn wait(&self, _attempt: u32) {
        tokio::time::sleep(self.0).await;
    }
}

#[derive(Debug)]
pub enum DeliveryState {
    Serializing(EnrichedDocument),
    Delivering { line: String, attempt: u32 },
    Retrying { line: String, attempt: u32 },
    Done { attempts: u32 },
    Abandoned(SerializationError),
    Fatal(DeliveryError),
}

impl DeliveryState {
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Done { .. } | Self::Abandoned(_) | Self::Fatal(_)
        )
    }
}

/// Terminal result of delivering one document.
#[derive(Debug)]
pub enum DeliveryOutcome {
    Delivered { attempts: u32 },
    Abandoned(SerializationError),
    Fatal(DeliveryError),
}

#[derive(Clone)]
pub struct DeliveryEngine {
    backend: Arc<dyn UpdateBackend>,
    backoff: Arc<dyn Backoff>,
    retry: bool,
}

impl DeliveryEngine {
    #[must_use]
    pub fn new(backend: Arc<dyn UpdateBackend>, backoff: Arc<dyn Backoff>, retry: bool) -> Self {
        Self {
            backend,
            backoff,
            retry,
        }
    }

    /// Performs one transition. Terminal states are returned unchanged.
    pub async fn step(&self, state: DeliveryState) -> DeliveryState {
        match state {
            DeliveryState::Serializing(document) => match document.to_line() {
                Ok(line) => DeliveryState::Delivering { line, attempt: 1 },
                Err(e) => {
                    error!("SOLR | {}, dropping message", e);
                    DeliveryState::Abandoned(e)
                }
            },
            DeliveryState::Delivering { line, attempt } => {
                let request = UpdateRequest::add_one(document_id(), line.clone());
                match self.backend.update(&request, true).await {
                    Ok(()) => {
                        debug!("SOLR | Delivered document after {} attempt(s)", attempt);
                        DeliveryState::Done { attempts: attempt }
                    }
                    Err(e) if self.retry => {
                        warn!(
                            "SOLR | Write attempt {} failed, retrying: {}",
                            attempt, e
                        );
                        DeliveryState::Retrying { line, attempt }
                    }
                    Err(e) => {
                        let e = DeliveryError::from(e);
                        error!("SOLR | {}", e);
                        DeliveryState::Fatal(e)
                    }
                }
            }
            DeliveryState::Retrying { line, attempt } => {
                self.backoff.wait(attempt).await;
                DeliveryState::Delivering {
                    line,
                    attempt: attempt + 1,
                }
            }
            terminal => terminal,
        }
    }

    /// Drives `document` until it is delivered, abandoned or fatally failed.
    pub async fn deliver(&self, document: EnrichedDocument) -> DeliveryOutcome {
        let mut state = DeliveryState::Serializing(document);
        loop {
            state = match self.step(state).await {
                DeliveryState::Done { attempts } => return DeliveryOutcome::Delivered { attempts },
                DeliveryState::Abandoned(e) => return DeliveryOutcome::Abandoned(e),
                DeliveryState::Fatal(e) => return DeliveryOutcome::Fatal(e),
                next => next,
            };
        }
    }
}
