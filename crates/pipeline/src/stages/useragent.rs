//! The user agent stamp.

use async_trait::async_trait;

use pulse_heartbeat::Heartbeat;

use crate::{Result, Stage, StageOutput};

/// Stamps the client user agent onto heartbeats that lack one.
///
/// Extra heartbeats may carry their own user agent from the invoking plugin;
/// those are kept.
pub struct UserAgentStamp {
    user_agent: String,
}

impl UserAgentStamp {
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
        }
    }
}

#[async_trait]
impl Stage for UserAgentStamp {
    fn name(&self) -> &'static str {
        "stamp_user_agent"
    }

    async fn process(&mut self, mut heartbeats: Vec<Heartbeat>) -> Result<StageOutput> {
        for heartbeat in &mut heartbeats {
            if heartbeat.user_agent.is_empty() {
                heartbeat.user_agent = self.user_agent.clone();
            }
        }

        Ok(StageOutput::Forward(heartbeats))
    }
}
