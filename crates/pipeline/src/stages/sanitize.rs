//! The sanitizer stage.

use async_trait::async_trait;

use pulse_heartbeat::sanitize::sanitize;
use pulse_heartbeat::{Heartbeat, SanitizeConfig};

use crate::{Result, Stage, StageOutput};

/// Redacts branch, project, and file names per the user's privacy policy.
pub struct Sanitizer {
    config: SanitizeConfig,
}

impl Sanitizer {
    pub fn new(config: SanitizeConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Stage for Sanitizer {
    fn name(&self) -> &'static str {
        "sanitize"
    }

    async fn process(&mut self, heartbeats: Vec<Heartbeat>) -> Result<StageOutput> {
        if self.config.is_empty() {
            return Ok(StageOutput::Forward(heartbeats));
        }

        Ok(StageOutput::Forward(
            heartbeats
                .into_iter()
                .map(|h| sanitize(h, &self.config))
                .collect(),
        ))
    }
}
