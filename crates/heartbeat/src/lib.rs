//! Heartbeat entity model.
//!
//! A heartbeat is one activity event: a snapshot of what a user was doing on
//! some entity (file, domain, or app) at a point in time. This crate owns the
//! in-memory representation, the wire serialization, the deduplication
//! identity, and the two pure policies that operate directly on heartbeats:
//! filtering and sanitization.
//!
//! # Wire format
//!
//! A heartbeat serializes to JSON with fixed keys; absent optional fields are
//! omitted entirely so the server can distinguish "unset" from zero values.
//! Fields marked `skip` never cross the wire; they carry local context
//! (detected project paths, the credential, enrichment inputs) between
//! pipeline stages.

mod category;
mod entity;
pub mod filter;
pub mod sanitize;
mod useragent;

pub use category::{Category, ParseCategoryError};
pub use entity::{EntityType, ParseEntityTypeError};
pub use filter::FilterConfig;
pub use sanitize::SanitizeConfig;
pub use useragent::{hostname, user_agent, CLIENT_NAME};

use serde::{Deserialize, Serialize};

/// One activity event.
///
/// Field order mirrors the wire key order. Optional wire fields are `Option`
/// so the serializer can omit them; local-only fields are skipped outright.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Heartbeat {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,

    pub category: Category,

    #[serde(rename = "cursorpos", skip_serializing_if = "Option::is_none")]
    pub cursor_position: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<Vec<String>>,

    pub entity: String,

    #[serde(rename = "type")]
    pub entity_type: EntityType,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_write: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    #[serde(rename = "lineno", skip_serializing_if = "Option::is_none")]
    pub line_number: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub lines: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_root_count: Option<i32>,

    pub time: f64,

    pub user_agent: String,

    // Local-only context, never transmitted.
    /// Credential routing this heartbeat; `None` means the default key
    #[serde(skip)]
    pub api_key: Option<String>,

    /// Entity exists only in the editor buffer, not on disk
    #[serde(skip)]
    pub is_unsaved_entity: bool,

    /// Fallback language when detection finds nothing
    #[serde(skip)]
    pub language_alternate: Option<String>,

    /// Total lines reported by the editor for unsaved entities
    #[serde(skip)]
    pub lines_in_file: Option<i32>,

    /// Local copy of the entity for enrichment reads
    #[serde(skip)]
    pub local_file: Option<String>,

    /// Fallback project when detection finds nothing
    #[serde(skip)]
    pub project_alternate: Option<String>,

    /// Project name forced by the user, wins over detection
    #[serde(skip)]
    pub project_override: Option<String>,

    /// Detected project root folder
    #[serde(skip)]
    pub project_path: Option<String>,

    /// Project root folder forced by the user
    #[serde(skip)]
    pub project_path_override: Option<String>,
}

impl Heartbeat {
    /// Deduplication identity.
    ///
    /// Two heartbeats agreeing on this tuple describe the same activity
    /// sample and yield the same string.
    pub fn id(&self) -> String {
        format!(
            "{}-{}-{}-{}-{}-{}-{}",
            self.time,
            self.entity_type,
            self.category,
            self.project.as_deref().unwrap_or(""),
            self.branch.as_deref().unwrap_or(""),
            self.entity,
            self.is_write.unwrap_or(false),
        )
    }
}

/// Delivery outcome for a single heartbeat.
///
/// The bulk endpoint answers per item; `status` is the per-item HTTP status.
/// A synthetic status of `0` marks a heartbeat that was deferred to the
/// offline queue without any network attempt. `heartbeat` is not guaranteed
/// for error statuses.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Outcome {
    pub status: u16,

    pub errors: Vec<String>,

    pub heartbeat: Option<Heartbeat>,
}

/// Status used for outcomes of heartbeats deferred to the offline queue.
pub const STATUS_DEFERRED: u16 = 0;

impl Outcome {
    /// Whether the server accepted this heartbeat.
    pub fn is_accepted(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Whether this outcome warrants re-queueing for a later retry.
    ///
    /// Rate-limited and server-side failures are retried; client errors
    /// (e.g. 400 malformed heartbeat) are dropped for good.
    pub fn is_retryable(&self) -> bool {
        self.status == 429 || self.status >= 500
    }
}

#[cfg(test)]
#[path = "lib_test.rs"]
mod tests;
