//! Target discovery through the `/json/list` HTTP endpoint.

use std::time::Duration;

use tracing::{debug, trace};

use crate::error::CdpError;
use crate::protocol::Target;

/// Host used when the caller does not name one.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Upper bound on a single discovery request.
pub const DISCOVERY_TIMEOUT: Duration = Duration::from_secs(5);

/// List the targets currently exposed on `host:port`.
///
/// Exactly one GET, no retries: polling policy belongs to the caller.
/// Duplicate ids are passed through as-is.
pub async fn discover_targets(port: u16, host: &str) -> Result<Vec<Target>, CdpError> {
    let url = format!("http://{}:{}/json/list", host, port);
    debug!("Discovering targets at {}", url);

    let client = reqwest::Client::builder()
        .timeout(DISCOVERY_TIMEOUT)
        .no_proxy()
        .build()
        .map_err(|e| CdpError::Connection {
            port,
            message: e.to_string(),
        })?;

    let response = client.get(&url).send().await.map_err(|e| CdpError::Connection {
        port,
        message: e.to_string(),
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(CdpError::HttpStatus {
            port,
            status: status.as_u16(),
        });
    }

    let body = response.text().await.map_err(|e| CdpError::Connection {
        port,
        message: e.to_string(),
    })?;
    trace!("Target list: {}", body);

    let targets: Vec<Target> = serde_json::from_str(&body)
        .map_err(|e| CdpError::InvalidResponse(format!("target list on port {}: {}", port, e)))?;

    debug!("Port {} exposes {} target(s)", port, targets.len());
    Ok(targets)
}

#[cfg(test)]
#[path = "discovery_tests.rs"]
mod tests;
