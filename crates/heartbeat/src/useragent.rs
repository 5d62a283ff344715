//! User agent construction.

use std::env::consts;

/// Client identifier sent in the user agent.
pub const CLIENT_NAME: &str = "wakatime";

/// Reported when the invoking plugin does not identify itself.
const UNKNOWN_PLUGIN: &str = "Unknown/0";

/// Build the user agent string:
/// `wakatime/{version} ({os}-{kernel}-{platform}) {runtime} {plugin}`.
pub fn user_agent(plugin: Option<&str>) -> String {
    let kernel = sysinfo::System::kernel_version().unwrap_or_else(|| "unknown".to_string());

    let plugin = match plugin {
        Some(plugin) if !plugin.is_empty() => plugin,
        _ => UNKNOWN_PLUGIN,
    };

    format!(
        "{}/{} ({}-{}-{}) rust/{} {}",
        CLIENT_NAME,
        env!("CARGO_PKG_VERSION"),
        consts::OS,
        kernel,
        consts::ARCH,
        env!("CARGO_PKG_RUST_VERSION"),
        plugin,
    )
}

/// The machine's hostname, if discoverable.
pub fn hostname() -> Option<String> {
    sysinfo::System::host_name()
}
