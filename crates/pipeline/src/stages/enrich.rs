//! Enricher stages.
//!
//! Enrichers run arbitrary detection logic against the filesystem. A panic
//! in one of them must not take down the batch, so every heartbeat passes
//! through a catch_unwind boundary; on panic the heartbeat continues
//! unenriched.

use std::panic::{catch_unwind, AssertUnwindSafe};

use async_trait::async_trait;
use tracing::warn;

use pulse_enrich::{detect_language, detect_project, filter_by_project, ProjectConfig};
use pulse_heartbeat::{FilterConfig, Heartbeat};

use crate::{Result, Stage, StageOutput};

fn contained<F>(heartbeats: Vec<Heartbeat>, stage: &'static str, enrich: F) -> Vec<Heartbeat>
where
    F: Fn(Heartbeat) -> Heartbeat,
{
    heartbeats
        .into_iter()
        .map(|h| {
            let fallback = h.clone();
            catch_unwind(AssertUnwindSafe(|| enrich(h))).unwrap_or_else(|_| {
                warn!("{stage} panicked, heartbeat passes through unenriched");
                fallback
            })
        })
        .collect()
}

/// Detects project, branch, and project root, then applies the
/// project-dependent filter rules.
pub struct ProjectDetector {
    project: ProjectConfig,
    filter: FilterConfig,
}

impl ProjectDetector {
    pub fn new(project: ProjectConfig, filter: FilterConfig) -> Self {
        Self { project, filter }
    }
}

#[async_trait]
impl Stage for ProjectDetector {
    fn name(&self) -> &'static str {
        "detect_project"
    }

    async fn process(&mut self, heartbeats: Vec<Heartbeat>) -> Result<StageOutput> {
        let config = self.project.clone();
        let detected = contained(heartbeats, "project detection", move |h| {
            detect_project(h, &config)
        });

        Ok(StageOutput::Forward(filter_by_project(
            detected,
            &self.filter,
        )))
    }
}

/// Fills in the language from the entity extension.
pub struct LanguageDetector;

#[async_trait]
impl Stage for LanguageDetector {
    fn name(&self) -> &'static str {
        "detect_language"
    }

    async fn process(&mut self, heartbeats: Vec<Heartbeat>) -> Result<StageOutput> {
        Ok(StageOutput::Forward(contained(
            heartbeats,
            "language detection",
            detect_language,
        )))
    }
}

/// Scans file contents for imported dependencies.
pub struct DependencyScanner;

#[async_trait]
impl Stage for DependencyScanner {
    fn name(&self) -> &'static str {
        "scan_dependencies"
    }

    async fn process(&mut self, heartbeats: Vec<Heartbeat>) -> Result<StageOutput> {
        Ok(StageOutput::Forward(contained(
            heartbeats,
            "dependency scanning",
            pulse_enrich::deps::scan_dependencies,
        )))
    }
}
