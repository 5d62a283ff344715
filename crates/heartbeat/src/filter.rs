//! Heartbeat filtering.
//!
//! Filtering drops heartbeats that should never reach the API: entities for
//! files that do not exist, and entities matching the user's exclude
//! patterns. Project-dependent filter rules (unknown project, missing project
//! marker file) live with project detection, which runs later in the
//! pipeline and is the first point where that information exists.

use std::path::Path;

use pulse_pattern::Pattern;
use tracing::debug;

use crate::{EntityType, Heartbeat};

/// Filter policy loaded from config.
#[derive(Debug, Default, Clone)]
pub struct FilterConfig {
    /// Entities matching any of these are dropped (unless included)
    pub exclude: Vec<Pattern>,

    /// Entities matching any of these survive even when excluded
    pub include: Vec<Pattern>,

    /// Drop heartbeats with no detected project (applied post-detection)
    pub exclude_unknown_project: bool,

    /// Drop heartbeats without a project marker file (applied post-detection)
    pub include_only_with_project_file: bool,
}

impl FilterConfig {
    /// Whether the pre-detection rules can drop anything at all.
    pub fn is_empty(&self) -> bool {
        self.exclude.is_empty() && self.include.is_empty()
    }
}

/// Drop heartbeats whose file entity does not exist on disk.
///
/// Unsaved entities are exempt: the editor told us the file only lives in a
/// buffer. Non-file entities are never checked.
pub fn filter_file_existence(heartbeats: Vec<Heartbeat>) -> Vec<Heartbeat> {
    heartbeats
        .into_iter()
        .filter(|h| match check_file_exists(h) {
            Ok(()) => true,
            Err(reason) => {
                debug!("skipping because of {reason}");
                false
            }
        })
        .collect()
}

/// Drop heartbeats matching an exclude pattern, unless an include pattern
/// also matches. Include wins.
pub fn filter_patterns(heartbeats: Vec<Heartbeat>, config: &FilterConfig) -> Vec<Heartbeat> {
    if config.is_empty() {
        return heartbeats;
    }

    heartbeats
        .into_iter()
        .filter(|h| match check_patterns(h, config) {
            Ok(()) => true,
            Err(reason) => {
                debug!("skipping because of {reason}");
                false
            }
        })
        .collect()
}

fn check_file_exists(h: &Heartbeat) -> Result<(), String> {
    if h.entity_type != EntityType::File || h.is_unsaved_entity {
        return Ok(());
    }

    if !Path::new(&h.entity).exists() {
        return Err(format!("non-existing file {:?}", h.entity));
    }

    Ok(())
}

fn check_patterns(h: &Heartbeat, config: &FilterConfig) -> Result<(), String> {
    let excluded = config.exclude.iter().find(|p| p.is_match(&h.entity));

    if let Some(pattern) = excluded {
        let included = config.include.iter().any(|p| p.is_match(&h.entity));
        if !included {
            return Err(format!(
                "matching exclude pattern {:?} for entity {:?}",
                pattern.as_str(),
                h.entity
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "filter_test.rs"]
mod tests;
