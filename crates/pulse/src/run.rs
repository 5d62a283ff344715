//! The heartbeat command: load parameters, assemble the pipeline, send.

use std::io::Read;
use std::path::{Path, PathBuf};

use tracing::{debug, error, warn};

use pulse_api::{ApiError, Client, ClientOptions};
use pulse_config::{ConfigError, ConfigView};
use pulse_heartbeat::{Heartbeat, Outcome};
use pulse_offline::Queue;
use pulse_pipeline::stages::{
    ApiSink, BackoffGuard, DependencyScanner, FileExistenceFilter, LanguageDetector, OfflineDrain,
    PatternFilter, ProjectDetector, Sanitizer, UserAgentStamp,
};
use pulse_pipeline::{Pipeline, PipelineError};

use crate::exitcode;
use crate::flags::Flags;
use crate::params::{
    expand_home, load_api_params, load_heartbeat_params, load_offline_params, ApiParams,
    HeartbeatParams, ParamsError,
};

/// Execute one invocation and return the process exit code.
pub async fn run(flags: &Flags) -> u8 {
    let mut view = ConfigView::new();
    flags.apply(&mut view);

    let config_path = flags
        .config
        .clone()
        .unwrap_or_else(pulse_config::default_config_path);

    let config_file = pulse_config::load_file(&config_path);
    if let Ok(table) = &config_file {
        view.merge_table(table.clone());
    }

    setup_logging(&view);

    if let Err(err) = config_file {
        error!("failed to load config file: {err}");
        return exitcode::ERR_CONFIG;
    }

    // stdin is read exactly once, before any slow work
    let extra_payload = if view.first_bool(&["extra-heartbeats"]).unwrap_or(false) {
        let mut payload = String::new();
        if let Err(err) = std::io::stdin().read_to_string(&mut payload) {
            error!("failed to read extra heartbeats from stdin: {err}");
            return exitcode::ERR_GENERIC;
        }
        Some(payload)
    } else {
        None
    };

    match send_heartbeats(&view, &config_path, extra_payload.as_deref()).await {
        Ok(_) => exitcode::SUCCESS,
        Err(err) => {
            error!("failed to send heartbeat(s): {err:#}");
            exit_code_for(&err)
        }
    }
}

fn setup_logging(view: &ConfigView) {
    let verbose = view
        .first_bool(&["verbose", "settings.debug"])
        .unwrap_or(false);

    let log_file = view
        .first_string(&["log-file", "logfile", "settings.log_file"])
        .filter(|path| !path.is_empty())
        .map(|path| PathBuf::from(expand_home(&path)))
        .unwrap_or_else(default_log_file);

    crate::init_logging(verbose, Some(&log_file));
}

fn default_log_file() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".pulse")
        .join("pulse.log")
}

/// Run one full heartbeat delivery.
///
/// `extra_payload` is the raw stdin content when the invocation carries
/// extra heartbeats. Returns the per-heartbeat outcomes of whatever survived
/// the pipeline.
pub async fn send_heartbeats(
    view: &ConfigView,
    config_path: &Path,
    extra_payload: Option<&str>,
) -> anyhow::Result<Vec<Outcome>> {
    let heartbeat_params = load_heartbeat_params(view, extra_payload)?;
    let api_params = load_api_params(view)?;
    let offline_params = load_offline_params(view)?;

    let user_agent = pulse_heartbeat::user_agent(api_params.plugin.as_deref());

    let client = Client::new(ClientOptions {
        base_url: api_params.url.clone(),
        api_key: api_params.key.clone(),
        user_agent: user_agent.clone(),
        hostname: api_params.hostname.clone(),
        timeout: api_params.timeout,
        proxy_url: api_params.proxy_url.clone(),
        disable_ssl_verify: api_params.no_ssl_verify,
        ssl_cert_path: api_params.ssl_certs_file.clone(),
    })?;

    let queue = if offline_params.disabled {
        debug!("offline queue disabled");
        None
    } else {
        Some(Queue::new(&offline_params.queue_file))
    };

    let heartbeats = build_heartbeats(&heartbeat_params, &api_params);

    let mut pipeline = Pipeline::new(vec![
        Box::new(FileExistenceFilter),
        Box::new(PatternFilter::new(heartbeat_params.filter.clone())),
        Box::new(BackoffGuard::new(api_params.backoff.clone(), queue.clone())),
        Box::new(OfflineDrain::new(queue.clone(), offline_params.sync_max)),
        Box::new(ProjectDetector::new(
            heartbeat_params.project.clone(),
            heartbeat_params.filter.clone(),
        )),
        Box::new(LanguageDetector),
        Box::new(DependencyScanner),
        Box::new(Sanitizer::new(heartbeat_params.sanitize.clone())),
        Box::new(UserAgentStamp::new(user_agent)),
        Box::new(ApiSink::new(
            client,
            queue,
            api_params.backoff.clone(),
            Some(config_path.to_path_buf()),
        )),
    ]);

    let outcomes = pipeline.run(heartbeats).await?;
    summarize(&outcomes);

    Ok(outcomes)
}

/// The primary heartbeat plus any extras, with invocation-wide context
/// (project folder override, per-entity credentials) applied to each.
fn build_heartbeats(params: &HeartbeatParams, api: &ApiParams) -> Vec<Heartbeat> {
    let primary = Heartbeat {
        entity: params.entity.clone(),
        entity_type: params.entity_type,
        category: params.category,
        time: params.time,
        is_write: params.is_write,
        is_unsaved_entity: params.is_unsaved_entity,
        language: params.language.clone(),
        language_alternate: params.language_alternate.clone(),
        cursor_position: params.cursor_position,
        line_number: params.line_number,
        lines: params
            .is_unsaved_entity
            .then_some(params.lines_in_file)
            .flatten(),
        lines_in_file: params.lines_in_file,
        local_file: params.local_file.clone(),
        project_override: params.project_override.clone(),
        project_alternate: params.project_alternate.clone(),
        ..Default::default()
    };

    let mut heartbeats = vec![primary];
    heartbeats.extend(params.extra_heartbeats.iter().cloned());

    for heartbeat in &mut heartbeats {
        if heartbeat.project_path_override.is_none() {
            heartbeat.project_path_override = params.project_path_override.clone();
        }

        heartbeat.api_key = api
            .key_patterns
            .iter()
            .find(|entry| entry.pattern.is_match(&heartbeat.entity))
            .map(|entry| entry.api_key.clone());
    }

    heartbeats
}

fn summarize(outcomes: &[Outcome]) {
    let accepted = outcomes.iter().filter(|o| o.is_accepted()).count();
    let deferred = outcomes
        .iter()
        .filter(|o| o.status == pulse_heartbeat::STATUS_DEFERRED)
        .count();
    let failed = outcomes.len() - accepted - deferred;

    debug!("heartbeats: {accepted} accepted, {deferred} deferred, {failed} failed");

    for outcome in outcomes {
        for error in &outcome.errors {
            warn!("api error for heartbeat: {error}");
        }
    }
}

/// Map a failure onto the documented exit codes.
pub fn exit_code_for(err: &anyhow::Error) -> u8 {
    if let Some(params) = err.downcast_ref::<ParamsError>() {
        return match params {
            ParamsError::Auth(_) => exitcode::ERR_AUTH,
            ParamsError::InvalidArgument(_) => exitcode::ERR_CONFIG,
        };
    }

    if err.downcast_ref::<ConfigError>().is_some() {
        return exitcode::ERR_CONFIG;
    }

    if let Some(pipeline) = err.downcast_ref::<PipelineError>() {
        return match pipeline {
            PipelineError::Api(ApiError::Auth(_)) => exitcode::ERR_AUTH,
            _ => exitcode::ERR_GENERIC,
        };
    }

    if let Some(api) = err.downcast_ref::<ApiError>() {
        return match api {
            ApiError::Auth(_) => exitcode::ERR_AUTH,
            _ => exitcode::ERR_GENERIC,
        };
    }

    exitcode::ERR_GENERIC
}

#[cfg(test)]
#[path = "run_test.rs"]
mod tests;
