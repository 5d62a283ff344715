//! Dependency scanning.
//!
//! For file heartbeats with a known language, the scanner reads the file
//! content and extracts imported modules. Scanners are intentionally
//! line-oriented: they only need to find import statements, not parse the
//! language.

mod golang;
mod python;
mod rustlang;
mod swift;

use std::fs;
use std::path::Path;

use pulse_heartbeat::{EntityType, Heartbeat};
use tracing::debug;

/// Files beyond this size are skipped; imports live near the top anyway.
const MAX_FILE_SIZE: u64 = 512 * 1024;

/// Dependency names longer than this are truncated.
const MAX_DEPENDENCY_LENGTH: usize = 200;

/// At most this many dependencies are reported per heartbeat.
const MAX_DEPENDENCY_COUNT: usize = 1000;

/// Scan the heartbeat's file for imported dependencies.
///
/// Missing files, unknown languages, and oversized files leave the heartbeat
/// unchanged.
pub fn scan_dependencies(mut h: Heartbeat) -> Heartbeat {
    if h.entity_type != EntityType::File || h.dependencies.is_some() {
        return h;
    }

    let Some(language) = h.language.as_deref() else {
        return h;
    };

    let path = h.local_file.as_deref().unwrap_or(&h.entity);
    let Some(contents) = read_source(Path::new(path)) else {
        return h;
    };

    let dependencies = match language {
        "Go" => golang::parse(&contents),
        "Python" => python::parse(&contents),
        "Rust" => rustlang::parse(&contents),
        "Swift" => swift::parse(&contents),
        _ => return h,
    };

    let dependencies = sanitize_dependencies(dependencies);
    if !dependencies.is_empty() {
        debug!(
            "detected {} dependency(ies) in {path:?}",
            dependencies.len()
        );
        h.dependencies = Some(dependencies);
    }

    h
}

fn read_source(path: &Path) -> Option<String> {
    let metadata = fs::metadata(path).ok()?;
    if !metadata.is_file() || metadata.len() > MAX_FILE_SIZE {
        return None;
    }

    fs::read_to_string(path).ok()
}

/// Deduplicate preserving order, bound name length and list size.
fn sanitize_dependencies(dependencies: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut sanitized = Vec::new();

    for dependency in dependencies {
        let dependency: String = dependency.chars().take(MAX_DEPENDENCY_LENGTH).collect();
        if dependency.is_empty() || !seen.insert(dependency.clone()) {
            continue;
        }

        sanitized.push(dependency);
        if sanitized.len() == MAX_DEPENDENCY_COUNT {
            break;
        }
    }

    sanitized
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
