//! Pulse - developer-activity heartbeat client.
//!
//! Editor plugins invoke the `pulse` binary once per activity event. The
//! invocation validates and enriches the heartbeat (plus optional extra
//! heartbeats from stdin), delivers the batch to the bulk API grouped by
//! credential, and parks anything undeliverable in the local offline queue
//! for the next invocation.
//!
//! The library target exists so end-to-end tests can drive an invocation
//! without spawning the binary.

pub mod exitcode;
pub mod flags;
pub mod params;
pub mod run;

use std::path::Path;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber.
///
/// Logs go to the log file so editor plugins never see diagnostics on the
/// wire; stderr is used only when the file cannot be opened.
pub fn init_logging(verbose: bool, log_file: Option<&Path>) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));

    let file = log_file.and_then(|path| {
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .ok()
    });

    match file {
        Some(file) => {
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .with_ansi(false)
                        .with_writer(std::sync::Arc::new(file)),
                )
                .with(filter)
                .init();
        }
        None => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(std::io::stderr))
                .with(filter)
                .init();
        }
    }
}
