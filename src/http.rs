//! Shared HTTP plumbing for outbound provider and model calls.
use anyhow::{anyhow, Context, Result};
use serde_json::Value;
use std::time::{Duration, Instant};

/// Build an agent with a single end-to-end timeout.
///
/// Status codes are checked by callers so non-2xx replies can be reported
/// with the URL and code rather than as transport errors.
pub(crate) fn agent(timeout: Duration) -> ureq::Agent {
    let config = ureq::Agent::config_builder()
        .timeout_global(Some(timeout))
        .http_status_as_error(false)
        .build();
    ureq::Agent::new_with_config(config)
}

/// GET `url` with optional headers and decode a JSON body from a 2xx reply.
pub(crate) fn get_json(agent: &ureq::Agent, url: &str, headers: &[(&str, &str)]) -> Result<Value> {
    let start = Instant::now();
    let mut request = agent.get(url);
    for (name, value) in headers {
        request = request.header(*name, *value);
    }
    let mut response = request.call().with_context(|| format!("GET {url}"))?;
    let status = response.status();
    tracing::debug!(
        url,
        status = status.as_u16(),
        elapsed_ms = start.elapsed().as_millis(),
        "source request complete"
    );
    if !status.is_success() {
        return Err(anyhow!("GET {url} returned status {}", status.as_u16()));
    }
    response
        .body_mut()
        .read_json::<Value>()
        .with_context(|| format!("decode JSON from {url}"))
}
