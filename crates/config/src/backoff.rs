//! Persisted rate-limit backoff state.
//!
//! When the API rate limits or fails server-side, the client records the
//! failure time and a retry counter in the `[internal]` section of the
//! config file. Subsequent invocations inside the exponential window defer
//! their heartbeats to the offline queue instead of calling the API.

use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, Local, Utc};
use tracing::debug;

use crate::{update_section, ConfigView, Result};

/// Config section holding client-internal state.
pub const INTERNAL_SECTION: &str = "internal";

/// Key for the time of the last rate-limited or failed call.
pub const BACKOFF_AT_KEY: &str = "backoff_at";

/// Key for the consecutive-failure counter.
pub const BACKOFF_RETRIES_KEY: &str = "backoff_retries";

/// Timestamp format used in the config file, e.g. `2021-08-30T18:50:42-03:00`.
pub const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%:z";

/// Base backoff window; doubles with every consecutive failure.
const BASE_DELAY: Duration = Duration::from_secs(15);

/// Cap on the doubling exponent so the window cannot overflow.
const MAX_EXPONENT: u32 = 21;

/// Backoff state as read from and written to the config file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BackoffState {
    /// When the backoff window started; absent when not backing off
    pub at: Option<DateTime<FixedOffset>>,

    /// Consecutive failures so far
    pub retries: u32,
}

impl BackoffState {
    /// Read the persisted state from the merged config view.
    ///
    /// An unparseable timestamp counts as absent while the retry counter is
    /// preserved, so a corrupted `backoff_at` never blocks sending.
    pub fn from_config(view: &ConfigView) -> Self {
        let retries_key = internal_key(BACKOFF_RETRIES_KEY);
        let retries = view
            .first_string(&[retries_key.as_str()])
            .and_then(|raw| raw.trim().parse().ok())
            .unwrap_or(0);

        let at_key = internal_key(BACKOFF_AT_KEY);
        let at = view
            .first_string(&[at_key.as_str()])
            .and_then(|raw| {
                DateTime::parse_from_str(raw.trim(), DATE_FORMAT)
                    .map_err(|err| {
                        debug!("failed to parse backoff_at {raw:?}: {err}");
                    })
                    .ok()
            });

        Self { at, retries }
    }

    /// Whether sends should currently be deferred.
    ///
    /// The window is `2^retries * 15s` from the recorded failure time.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        let Some(at) = self.at else {
            return false;
        };

        let exponent = self.retries.min(MAX_EXPONENT);
        let window = BASE_DELAY * 2u32.pow(exponent);

        now < at.with_timezone(&Utc) + window
    }

    /// The state after one more failed delivery.
    pub fn after_failure(&self, now: DateTime<Utc>) -> Self {
        Self {
            at: Some(now.with_timezone(&Local).fixed_offset()),
            retries: self.retries.saturating_add(1),
        }
    }

    /// The state after a successful delivery.
    pub fn after_success() -> Self {
        Self::default()
    }

    /// Persist this state to the `[internal]` section of the config file.
    ///
    /// A cleared state removes both keys.
    pub fn save(&self, config_path: &Path) -> Result<()> {
        let at = self.at.map(|at| at.format(DATE_FORMAT).to_string());
        let retries = (self.retries > 0).then(|| self.retries.to_string());

        update_section(
            config_path,
            INTERNAL_SECTION,
            &[(BACKOFF_AT_KEY, at), (BACKOFF_RETRIES_KEY, retries)],
        )
    }
}

fn internal_key(key: &str) -> String {
    format!("{INTERNAL_SECTION}.{key}")
}

#[cfg(test)]
#[path = "backoff_test.rs"]
mod tests;
