//! The remote backoff guard.

use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;

use pulse_config::BackoffState;
use pulse_heartbeat::{Heartbeat, Outcome, STATUS_DEFERRED};
use pulse_offline::Queue;

use crate::{Result, Stage, StageOutput};

/// Skips the API entirely while the persisted backoff window is open.
///
/// Deferred heartbeats go straight to the offline queue and the run ends
/// with synthetic deferred outcomes, so the caller still sees one outcome
/// per heartbeat.
pub struct BackoffGuard {
    state: BackoffState,
    queue: Option<Queue>,
}

impl BackoffGuard {
    /// `queue` is `None` when offline storage is disabled; deferral then
    /// drops the heartbeats after logging.
    pub fn new(state: BackoffState, queue: Option<Queue>) -> Self {
        Self { state, queue }
    }
}

#[async_trait]
impl Stage for BackoffGuard {
    fn name(&self) -> &'static str {
        "backoff_guard"
    }

    async fn process(&mut self, heartbeats: Vec<Heartbeat>) -> Result<StageOutput> {
        if !self.state.is_active(Utc::now()) {
            return Ok(StageOutput::Forward(heartbeats));
        }

        debug!(
            "in backoff until rate limit window passes, deferring {} heartbeat(s)",
            heartbeats.len()
        );

        let count = heartbeats.len();

        match &self.queue {
            Some(queue) => queue.push_many(heartbeats)?,
            None => debug!("offline queue disabled, deferred heartbeats are dropped"),
        }

        let outcomes = (0..count)
            .map(|_| Outcome {
                status: STATUS_DEFERRED,
                ..Default::default()
            })
            .collect();

        Ok(StageOutput::Done(outcomes))
    }
}
