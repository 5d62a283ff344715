//! The offline queue drain.

use async_trait::async_trait;
use tracing::{debug, warn};

use pulse_heartbeat::Heartbeat;
use pulse_offline::Queue;

use crate::{Result, Stage, StageOutput};

/// Prepends previously queued heartbeats to the batch.
///
/// Drained heartbeats keep their pop order in front of the new input, so the
/// oldest buffered activity is delivered first. A drain limit of zero
/// disables draining entirely.
pub struct OfflineDrain {
    queue: Option<Queue>,
    sync_max: usize,
}

impl OfflineDrain {
    pub fn new(queue: Option<Queue>, sync_max: usize) -> Self {
        Self { queue, sync_max }
    }
}

#[async_trait]
impl Stage for OfflineDrain {
    fn name(&self) -> &'static str {
        "offline_drain"
    }

    async fn process(&mut self, heartbeats: Vec<Heartbeat>) -> Result<StageOutput> {
        let Some(queue) = &self.queue else {
            return Ok(StageOutput::Forward(heartbeats));
        };

        if self.sync_max == 0 {
            return Ok(StageOutput::Forward(heartbeats));
        }

        // a busy or broken queue must not fail the new heartbeats
        let mut batch = match queue.pop_many(self.sync_max) {
            Ok(drained) => {
                if !drained.is_empty() {
                    debug!("draining {} offline heartbeat(s)", drained.len());
                }
                drained
            }
            Err(err) => {
                warn!("failed to drain offline queue: {err}");
                Vec::new()
            }
        };

        batch.extend(heartbeats);
        Ok(StageOutput::Forward(batch))
    }
}
