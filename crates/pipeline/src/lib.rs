//! Heartbeat processing pipeline.
//!
//! A pipeline is an ordered chain of [`Stage`]s ending in a sink. Each stage
//! receives the surviving heartbeat list and either forwards a (possibly
//! shrunk or enriched) list to the next stage or terminates the run with its
//! own outcomes. A stage is never invoked with an empty batch: once nothing
//! survives, the run ends with no outcomes and no downstream work.
//!
//! The standard chain, in order:
//!
//! 1. file existence filter
//! 2. exclude/include pattern filter
//! 3. remote backoff guard (defers the whole batch to the offline queue)
//! 4. offline queue drain (prepends previously queued heartbeats)
//! 5. project detection and project-dependent filters
//! 6. language detection
//! 7. dependency scanning
//! 8. sanitizer
//! 9. user agent stamp
//! 10. API sink (wrapped by the offline queue for failed deliveries)

mod error;
pub mod stages;

pub use error::{PipelineError, Result};

use async_trait::async_trait;
use tracing::debug;

use pulse_heartbeat::{Heartbeat, Outcome};

/// What a stage hands back to the driver.
#[derive(Debug)]
pub enum StageOutput {
    /// Pass the surviving heartbeats to the next stage
    Forward(Vec<Heartbeat>),

    /// Terminate the run with these outcomes
    Done(Vec<Outcome>),
}

/// One pipeline stage.
#[async_trait]
pub trait Stage: Send {
    /// Stage name for logging
    fn name(&self) -> &'static str;

    /// Process the batch.
    ///
    /// Stages must preserve the relative order of heartbeats they forward.
    async fn process(&mut self, heartbeats: Vec<Heartbeat>) -> Result<StageOutput>;
}

/// An ordered chain of stages.
pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl Pipeline {
    /// Build a pipeline from stages in execution order.
    ///
    /// The final stage is expected to terminate the run; a chain that only
    /// forwards ends with no outcomes.
    pub fn new(stages: Vec<Box<dyn Stage>>) -> Self {
        Self { stages }
    }

    /// Run the batch through all stages.
    pub async fn run(&mut self, heartbeats: Vec<Heartbeat>) -> Result<Vec<Outcome>> {
        let mut batch = heartbeats;

        for stage in &mut self.stages {
            if batch.is_empty() {
                debug!("no heartbeats left, aborting before {}", stage.name());
                return Ok(Vec::new());
            }

            debug!("executing {} with {} heartbeat(s)", stage.name(), batch.len());

            match stage.process(batch).await? {
                StageOutput::Forward(survivors) => batch = survivors,
                StageOutput::Done(outcomes) => return Ok(outcomes),
            }
        }

        Ok(Vec::new())
    }
}

#[cfg(test)]
#[path = "lib_test.rs"]
mod tests;
