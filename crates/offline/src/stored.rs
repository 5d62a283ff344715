//! Storage form of a heartbeat.
//!
//! Queue rows hold the wire JSON plus the credential, which never crosses
//! the wire but must survive a restart so drained heartbeats keep routing to
//! the right account.

use serde::{Deserialize, Serialize};

use pulse_heartbeat::Heartbeat;

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct StoredHeartbeat {
    #[serde(flatten)]
    heartbeat: Heartbeat,

    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<String>,
}

impl From<Heartbeat> for StoredHeartbeat {
    fn from(mut heartbeat: Heartbeat) -> Self {
        let api_key = heartbeat.api_key.take();
        Self { heartbeat, api_key }
    }
}

impl From<StoredHeartbeat> for Heartbeat {
    fn from(stored: StoredHeartbeat) -> Self {
        let mut heartbeat = stored.heartbeat;
        heartbeat.api_key = stored.api_key;
        heartbeat
    }
}
