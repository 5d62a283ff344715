//! Heartbeat sanitization.
//!
//! Sanitization redacts fields the user asked to keep private. Steps run in
//! a fixed order: branch, project, file name, project folder. Each step is
//! independent and a step with no configured patterns is a no-op, so the
//! whole pass is idempotent.

use std::path::Path;

use pulse_pattern::Pattern;

use crate::{EntityType, Heartbeat};

/// Replacement for hidden file names; the original extension is kept.
const HIDDEN: &str = "HIDDEN";

/// Sanitize policy loaded from config.
#[derive(Debug, Default, Clone)]
pub struct SanitizeConfig {
    /// Branches matching any of these are removed
    pub hide_branch_names: Vec<Pattern>,

    /// Project names matching any of these are removed
    pub hide_project_names: Vec<Pattern>,

    /// Entities matching any of these are replaced with HIDDEN.<ext>
    pub hide_file_names: Vec<Pattern>,

    /// Strip the project folder prefix from the entity
    pub hide_project_folder: bool,
}

impl SanitizeConfig {
    /// Whether any step would modify a heartbeat.
    pub fn is_empty(&self) -> bool {
        self.hide_branch_names.is_empty()
            && self.hide_project_names.is_empty()
            && self.hide_file_names.is_empty()
            && !self.hide_project_folder
    }
}

/// Apply all sanitize steps to one heartbeat.
pub fn sanitize(mut h: Heartbeat, config: &SanitizeConfig) -> Heartbeat {
    h = hide_branch(h, &config.hide_branch_names);
    h = hide_project(h, &config.hide_project_names);
    h = hide_file_name(h, &config.hide_file_names);
    h = hide_project_folder(h, config.hide_project_folder);
    h
}

fn hide_branch(mut h: Heartbeat, patterns: &[Pattern]) -> Heartbeat {
    if let Some(branch) = &h.branch {
        if matches_any(patterns, branch) {
            h.branch = None;
        }
    }

    h
}

fn hide_project(mut h: Heartbeat, patterns: &[Pattern]) -> Heartbeat {
    if let Some(project) = &h.project {
        if matches_any(patterns, project) {
            h.project = None;
            // the alternate would leak the same name
            h.project_alternate = None;
        }
    }

    h
}

fn hide_file_name(mut h: Heartbeat, patterns: &[Pattern]) -> Heartbeat {
    if h.entity_type != EntityType::File || !matches_any(patterns, &h.entity) {
        return h;
    }

    let extension = Path::new(&h.entity)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{ext}"))
        .unwrap_or_default();

    h.entity = format!("{HIDDEN}{extension}");

    // these fields could identify the hidden file
    h.branch = None;
    h.cursor_position = None;
    h.dependencies = None;
    h.line_number = None;
    h.lines = None;

    h
}

fn hide_project_folder(mut h: Heartbeat, enabled: bool) -> Heartbeat {
    if !enabled {
        return h;
    }

    let prefix = match (&h.project_path_override, &h.project_path) {
        (Some(override_path), _) if !override_path.is_empty() => override_path.clone(),
        (_, Some(path)) if !path.is_empty() => path.clone(),
        _ => return h,
    };

    if let Some(stripped) = h.entity.strip_prefix(&prefix) {
        h.entity = stripped
            .trim_start_matches(['/', '\\'])
            .to_string();
    }

    h
}

fn matches_any(patterns: &[Pattern], text: &str) -> bool {
    patterns.iter().any(|p| p.is_match(text))
}

#[cfg(test)]
#[path = "sanitize_test.rs"]
mod tests;
