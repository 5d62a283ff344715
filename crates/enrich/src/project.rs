//! Project and branch detection.
//!
//! Detection sources, in precedence order:
//!
//! 1. an explicit override from the invocation
//! 2. a `projectmap.*` pattern matching the entity, with `{N}` placeholders
//!    substituted from capture groups
//! 3. a `.pulse-project` marker file in the entity's ancestry (first line
//!    project name, optional second line branch)
//! 4. a git checkout in the entity's ancestry (project from the repository
//!    folder name, branch from `.git/HEAD`)
//! 5. the alternate project supplied by the plugin
//!
//! Whatever the source, detection also records the project root path and its
//! component count for the wire format.

use std::fs;
use std::path::{Component, Path, PathBuf};

use pulse_heartbeat::{EntityType, FilterConfig, Heartbeat};
use pulse_pattern::Pattern;
use tracing::debug;

/// Marker file naming the project explicitly.
const PROJECT_MARKER_FILE: &str = ".pulse-project";

/// One `projectmap` entry: entities matching the pattern belong to `name`.
#[derive(Debug, Clone)]
pub struct MapPattern {
    pub pattern: Pattern,

    /// Project name; `{0}`, `{1}`, ... substitute capture groups
    pub name: String,
}

/// Project detection configuration.
#[derive(Debug, Clone, Default)]
pub struct ProjectConfig {
    /// Entity-pattern to project-name mappings
    pub map_patterns: Vec<MapPattern>,

    /// Entities matching any of these skip submodule detection
    pub submodules_disabled: Vec<Pattern>,
}

/// Detect project, branch, and project root for one heartbeat.
pub fn detect_project(mut h: Heartbeat, config: &ProjectConfig) -> Heartbeat {
    if h.entity_type != EntityType::File {
        if h.project.is_none() {
            h.project = h
                .project_override
                .clone()
                .or_else(|| h.project_alternate.clone());
        }
        return h;
    }

    let entity = PathBuf::from(h.local_file.as_deref().unwrap_or(&h.entity));

    // Branch and project root come from the checkout even when the project
    // name is forced or mapped.
    let detected = detect_repository(&entity, config);

    if let Some(detected) = &detected {
        if h.branch.is_none() {
            h.branch = detected.branch.clone();
        }
        if h.project_path.is_none() {
            h.project_path = Some(detected.root.display().to_string());
        }
        h.project_root_count = Some(component_count(&detected.root));
    }

    if h.project.is_some() {
        return h;
    }

    h.project = h
        .project_override
        .clone()
        .or_else(|| match_map_pattern(&h.entity, &config.map_patterns))
        .or_else(|| detected.as_ref().and_then(|d| d.project.clone()))
        .or_else(|| h.project_alternate.clone());

    h
}

/// Drop heartbeats failing the project-dependent filter rules.
///
/// Runs after detection: with `exclude_unknown_project` a heartbeat without
/// a project is dropped, and with `include_only_with_project_file` a
/// heartbeat without a marker file in its ancestry is dropped.
pub fn filter_by_project(heartbeats: Vec<Heartbeat>, config: &FilterConfig) -> Vec<Heartbeat> {
    if !config.exclude_unknown_project && !config.include_only_with_project_file {
        return heartbeats;
    }

    heartbeats
        .into_iter()
        .filter(|h| match check_project(h, config) {
            Ok(()) => true,
            Err(reason) => {
                debug!("skipping because of {reason}");
                false
            }
        })
        .collect()
}

fn check_project(h: &Heartbeat, config: &FilterConfig) -> Result<(), String> {
    if config.exclude_unknown_project && h.project.as_deref().unwrap_or("").is_empty() {
        return Err("unknown project".to_string());
    }

    if config.include_only_with_project_file && h.entity_type == EntityType::File {
        let entity = Path::new(h.local_file.as_deref().unwrap_or(&h.entity));
        if find_in_ancestry(entity, PROJECT_MARKER_FILE).is_none() {
            return Err(format!(
                "missing project file in parent path of {:?}",
                h.entity
            ));
        }
    }

    Ok(())
}

#[derive(Debug)]
struct DetectedRepository {
    project: Option<String>,
    branch: Option<String>,
    root: PathBuf,
}

fn detect_repository(entity: &Path, config: &ProjectConfig) -> Option<DetectedRepository> {
    if let Some(marker) = find_in_ancestry(entity, PROJECT_MARKER_FILE) {
        if let Some(detected) = read_marker_file(&marker) {
            return Some(detected);
        }
    }

    detect_git(entity, config)
}

fn read_marker_file(marker: &Path) -> Option<DetectedRepository> {
    let contents = fs::read_to_string(marker).ok()?;
    let mut lines = contents.lines().map(str::trim);

    let project = lines.next().filter(|line| !line.is_empty())?;
    let branch = lines.next().filter(|line| !line.is_empty());

    Some(DetectedRepository {
        project: Some(project.to_string()),
        branch: branch.map(str::to_string),
        root: marker.parent()?.to_path_buf(),
    })
}

fn detect_git(entity: &Path, config: &ProjectConfig) -> Option<DetectedRepository> {
    let skip_submodules = config
        .submodules_disabled
        .iter()
        .any(|p| p.is_match(&entity.display().to_string()));

    let mut dir = if entity.is_dir() {
        entity.to_path_buf()
    } else {
        entity.parent()?.to_path_buf()
    };

    loop {
        let git_path = dir.join(".git");

        if git_path.is_dir() {
            return Some(DetectedRepository {
                project: dir.file_name().map(|n| n.to_string_lossy().into_owned()),
                branch: read_branch(&git_path.join("HEAD")),
                root: dir,
            });
        }

        // a .git file marks a submodule or linked worktree
        if git_path.is_file() && !skip_submodules {
            if let Some(git_dir) = read_gitdir_pointer(&git_path, &dir) {
                return Some(DetectedRepository {
                    project: dir.file_name().map(|n| n.to_string_lossy().into_owned()),
                    branch: read_branch(&git_dir.join("HEAD")),
                    root: dir,
                });
            }
        }

        if !dir.pop() {
            return None;
        }
    }
}

fn read_gitdir_pointer(git_file: &Path, base: &Path) -> Option<PathBuf> {
    let contents = fs::read_to_string(git_file).ok()?;
    let target = contents.strip_prefix("gitdir:")?.trim();

    let path = PathBuf::from(target);
    if path.is_absolute() {
        Some(path)
    } else {
        Some(base.join(path))
    }
}

/// Read the current branch from a HEAD file. Detached heads yield `None`.
fn read_branch(head: &Path) -> Option<String> {
    let contents = fs::read_to_string(head).ok()?;
    let reference = contents.trim().strip_prefix("ref:")?.trim();
    let branch = reference.strip_prefix("refs/heads/")?;

    (!branch.is_empty()).then(|| branch.to_string())
}

fn match_map_pattern(entity: &str, patterns: &[MapPattern]) -> Option<String> {
    for mapping in patterns {
        let Some(groups) = mapping.pattern.captures(entity) else {
            continue;
        };

        let mut name = mapping.name.clone();
        for (i, group) in groups.iter().enumerate() {
            name = name.replace(&format!("{{{i}}}"), group);
        }

        return Some(name);
    }

    None
}

fn find_in_ancestry(entity: &Path, file_name: &str) -> Option<PathBuf> {
    let start = if entity.is_dir() {
        entity
    } else {
        entity.parent()?
    };

    start
        .ancestors()
        .map(|dir| dir.join(file_name))
        .find(|candidate| candidate.is_file())
}

fn component_count(path: &Path) -> i32 {
    path.components()
        .filter(|c| matches!(c, Component::Normal(_)))
        .count() as i32
}

#[cfg(test)]
#[path = "project_test.rs"]
mod tests;
