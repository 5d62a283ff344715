//! The HTTP client.

use std::path::PathBuf;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::header;
use tracing::debug;

use pulse_heartbeat::{Heartbeat, Outcome};

use crate::response::parse_heartbeat_responses;
use crate::{ApiError, Result};

/// Canonical API base URL.
pub const BASE_URL: &str = "https://api.wakatime.com/api/v1";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Connection options for [`Client::new`].
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// API base URL, already normalized (no trailing slash or endpoint path)
    pub base_url: String,

    /// Default credential for heartbeats without an explicit one
    pub api_key: String,

    /// Full user agent string
    pub user_agent: String,

    /// Machine name sent alongside heartbeats, when known
    pub hostname: Option<String>,

    /// Per-request timeout
    pub timeout: Duration,

    /// Optional proxy URL (http, https, or socks5)
    pub proxy_url: Option<String>,

    /// Skip TLS certificate verification
    pub disable_ssl_verify: bool,

    /// Extra root certificates in PEM format
    pub ssl_cert_path: Option<PathBuf>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            base_url: BASE_URL.to_string(),
            api_key: String::new(),
            user_agent: String::new(),
            hostname: None,
            timeout: DEFAULT_TIMEOUT,
            proxy_url: None,
            disable_ssl_verify: false,
            ssl_cert_path: None,
        }
    }
}

/// Bulk heartbeat API client.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct Client {
    options: ClientOptions,
    http: reqwest::Client,
}

impl Client {
    /// The default credential.
    pub fn api_key(&self) -> &str {
        &self.options.api_key
    }

    /// Build a client from options.
    ///
    /// # Errors
    ///
    /// Fails when the proxy URL or certificate file is unusable.
    pub fn new(options: ClientOptions) -> Result<Self> {
        let mut builder = reqwest::Client::builder().timeout(options.timeout);

        if let Some(proxy_url) = &options.proxy_url {
            let proxy = reqwest::Proxy::all(proxy_url)
                .map_err(|err| ApiError::Other(format!("invalid proxy url: {err}")))?;
            builder = builder.proxy(proxy);
        }

        if options.disable_ssl_verify {
            builder = builder.danger_accept_invalid_certs(true);
        }

        if let Some(cert_path) = &options.ssl_cert_path {
            let pem = std::fs::read(cert_path).map_err(|err| {
                ApiError::Other(format!(
                    "failed to read ssl certs file {:?}: {err}",
                    cert_path
                ))
            })?;
            let cert = reqwest::Certificate::from_pem(&pem)
                .map_err(|err| ApiError::Other(format!("invalid ssl certs file: {err}")))?;
            builder = builder.add_root_certificate(cert);
        }

        let http = builder
            .build()
            .map_err(|err| ApiError::Other(format!("failed to build http client: {err}")))?;

        Ok(Self { options, http })
    }

    /// Send a batch of heartbeats to the bulk endpoint.
    ///
    /// The batch is partitioned by credential. A single-credential batch is
    /// sent in the calling task; otherwise one task per credential runs
    /// concurrently and all are joined before returning. Within a group the
    /// result order matches submission order.
    pub async fn send_heartbeats(&self, heartbeats: Vec<Heartbeat>) -> Result<Vec<Outcome>> {
        let url = format!("{}/users/current/heartbeats.bulk", self.options.base_url);

        debug!("sending {} heartbeat(s) to api at {url}", heartbeats.len());

        let mut grouped = group_by_api_key(heartbeats, &self.options.api_key);

        if grouped.len() == 1 {
            let (api_key, batch) = grouped.remove(0);
            return self.send_batch(&url, &api_key, batch).await;
        }

        let mut handles = Vec::with_capacity(grouped.len());
        for (api_key, batch) in grouped {
            let client = self.clone();
            let url = url.clone();
            handles.push(tokio::spawn(async move {
                client.send_batch(&url, &api_key, batch).await
            }));
        }

        let mut results = Vec::new();
        let mut first_error = None;

        for handle in handles {
            let joined = handle
                .await
                .map_err(|err| ApiError::Other(format!("send task panicked: {err}")))?;

            match joined {
                Ok(outcomes) => results.extend(outcomes),
                Err(err) if first_error.is_none() => first_error = Some(err),
                Err(_) => {}
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(results),
        }
    }

    async fn send_batch(
        &self,
        url: &str,
        api_key: &str,
        heartbeats: Vec<Heartbeat>,
    ) -> Result<Vec<Outcome>> {
        let body = serde_json::to_vec(&heartbeats)
            .map_err(|err| ApiError::Other(format!("failed to json encode body: {err}")))?;

        let mut request = self
            .http
            .post(url)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::ACCEPT, "application/json")
            .header(header::AUTHORIZATION, basic_auth(api_key))
            .header(header::USER_AGENT, self.options.user_agent.as_str())
            .body(body);

        if let Some(hostname) = &self.options.hostname {
            request = request.header("X-Machine-Name", hostname.as_str());
        }

        let response = request
            .send()
            .await
            .map_err(|err| ApiError::Transient(format!("failed making request to {url:?}: {err}")))?;

        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(|err| {
            ApiError::Transient(format!("failed reading response body from {url:?}: {err}"))
        })?;

        match status {
            201 | 202 => parse_heartbeat_responses(&body),
            401 => Err(ApiError::Auth(format!("authentication failed at {url:?}"))),
            400 => Err(ApiError::BadRequest(format!("bad request at {url:?}"))),
            429 => Err(ApiError::RateLimited(format!(
                "too many requests at {url:?}"
            ))),
            500..=599 => Err(ApiError::Transient(format!(
                "server error at {url:?}. got: {status}. body: {:?}",
                String::from_utf8_lossy(&body)
            ))),
            other => Err(ApiError::Other(format!(
                "invalid response status from {url:?}. got: {other}, want: 201/202. body: {:?}",
                String::from_utf8_lossy(&body)
            ))),
        }
    }
}

/// Partition a batch by credential, preserving first-seen group order and
/// submission order within each group.
///
/// Exposed so callers can reconstruct the outcome order of a multi-group
/// send when cross-referencing outcomes with submitted heartbeats.
pub fn group_by_api_key(
    heartbeats: Vec<Heartbeat>,
    default_key: &str,
) -> Vec<(String, Vec<Heartbeat>)> {
    let mut grouped: Vec<(String, Vec<Heartbeat>)> = Vec::new();

    for heartbeat in heartbeats {
        let key = heartbeat
            .api_key
            .clone()
            .unwrap_or_else(|| default_key.to_string());

        match grouped.iter_mut().find(|(group_key, _)| *group_key == key) {
            Some((_, group)) => group.push(heartbeat),
            None => grouped.push((key, vec![heartbeat])),
        }
    }

    grouped
}

fn basic_auth(api_key: &str) -> String {
    format!("Basic {}", BASE64.encode(api_key))
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
