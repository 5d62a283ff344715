//! The API sink, wrapped by the offline queue.
//!
//! This is the durability boundary. Heartbeats that the API does not accept
//! in this invocation end up in the offline queue exactly once:
//!
//! - a retryable request failure (network, timeout, 429, 5xx) parks the
//!   whole batch and opens the backoff window;
//! - per-item 429/5xx results in an otherwise successful response park just
//!   those heartbeats;
//! - terminal failures (auth, bad request) surface to the caller without
//!   queueing, matching the remote's verdict that a retry cannot succeed.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, warn};

use pulse_api::{group_by_api_key, Client};
use pulse_config::BackoffState;
use pulse_heartbeat::{Heartbeat, Outcome, STATUS_DEFERRED};
use pulse_offline::Queue;

use crate::{Result, Stage, StageOutput};

/// Terminal stage: bulk-posts the batch and reconciles the results.
pub struct ApiSink {
    client: Client,
    queue: Option<Queue>,
    backoff: BackoffState,
    config_path: Option<PathBuf>,
}

impl ApiSink {
    /// `queue` is `None` when offline storage is disabled. `config_path` is
    /// where backoff state changes are persisted; `None` skips persistence.
    pub fn new(
        client: Client,
        queue: Option<Queue>,
        backoff: BackoffState,
        config_path: Option<PathBuf>,
    ) -> Self {
        Self {
            client,
            queue,
            backoff,
            config_path,
        }
    }

    fn persist_backoff(&self, state: &BackoffState) {
        let Some(path) = &self.config_path else {
            return;
        };

        if let Err(err) = state.save(path) {
            warn!("failed to persist backoff state: {err}");
        }
    }

    fn requeue(&self, heartbeats: Vec<Heartbeat>) -> Result<()> {
        match &self.queue {
            Some(queue) => Ok(queue.push_many(heartbeats)?),
            None => {
                debug!("offline queue disabled, undelivered heartbeats are dropped");
                Ok(())
            }
        }
    }
}

#[async_trait]
impl Stage for ApiSink {
    fn name(&self) -> &'static str {
        "api_sink"
    }

    async fn process(&mut self, heartbeats: Vec<Heartbeat>) -> Result<StageOutput> {
        // outcomes come back in flattened group order
        let submitted: Vec<Heartbeat> = group_by_api_key(heartbeats.clone(), self.client.api_key())
            .into_iter()
            .flat_map(|(_, group)| group)
            .collect();

        match self.client.send_heartbeats(heartbeats).await {
            Ok(outcomes) => {
                if self.backoff != BackoffState::after_success() {
                    self.backoff = BackoffState::after_success();
                    self.persist_backoff(&BackoffState::after_success());
                }

                let rejected: Vec<Heartbeat> = submitted
                    .into_iter()
                    .zip(&outcomes)
                    .filter(|(_, outcome)| outcome.is_retryable())
                    .map(|(heartbeat, _)| heartbeat)
                    .collect();

                if !rejected.is_empty() {
                    debug!("re-queueing {} rejected heartbeat(s)", rejected.len());
                    self.requeue(rejected)?;
                }

                Ok(StageOutput::Done(outcomes))
            }

            Err(err) if err.is_retryable() => {
                warn!("failed to deliver heartbeats: {err}");

                let state = self.backoff.after_failure(Utc::now());
                self.persist_backoff(&state);
                self.backoff = state;

                let count = submitted.len();
                self.requeue(submitted)?;

                let outcomes = (0..count)
                    .map(|_| Outcome {
                        status: STATUS_DEFERRED,
                        ..Default::default()
                    })
                    .collect();

                Ok(StageOutput::Done(outcomes))
            }

            // terminal: auth, bad request, protocol mismatch
            Err(err) => Err(err.into()),
        }
    }
}
