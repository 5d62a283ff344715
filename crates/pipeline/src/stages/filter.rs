//! Filtering stages.

use async_trait::async_trait;

use pulse_heartbeat::filter::{filter_file_existence, filter_patterns};
use pulse_heartbeat::{FilterConfig, Heartbeat};

use crate::{Result, Stage, StageOutput};

/// Drops file heartbeats whose entity does not exist on disk.
pub struct FileExistenceFilter;

#[async_trait]
impl Stage for FileExistenceFilter {
    fn name(&self) -> &'static str {
        "filter_file_existence"
    }

    async fn process(&mut self, heartbeats: Vec<Heartbeat>) -> Result<StageOutput> {
        Ok(StageOutput::Forward(filter_file_existence(heartbeats)))
    }
}

/// Drops heartbeats matching the user's exclude patterns.
pub struct PatternFilter {
    config: FilterConfig,
}

impl PatternFilter {
    pub fn new(config: FilterConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Stage for PatternFilter {
    fn name(&self) -> &'static str {
        "filter_patterns"
    }

    async fn process(&mut self, heartbeats: Vec<Heartbeat>) -> Result<StageOutput> {
        Ok(StageOutput::Forward(filter_patterns(
            heartbeats,
            &self.config,
        )))
    }
}
