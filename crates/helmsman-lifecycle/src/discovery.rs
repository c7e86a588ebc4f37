//! Locating the debugging port of a launched instance.

use async_trait::async_trait;
use helmsman_cdp::{DEFAULT_HOST, discover_targets};
use tracing::{debug, trace};

/// Ports probed above the launcher port when no candidates are configured.
pub const DEFAULT_SCAN_SPAN: u16 = 16;

/// Finds the live debugging port belonging to a launcher.
///
/// A returned port must already answer the discovery endpoint.
#[async_trait]
pub trait PortDiscovery: Send + Sync {
    async fn discover_instance_port(&self, launcher_port: u16) -> Option<u16>;
}

/// Probes ports with a discovery request and returns the first that answers.
///
/// Probes `candidates` in order, or `launcher_port + 1 ..= launcher_port + scan_span`
/// when the list is empty.
#[derive(Debug, Clone)]
pub struct ProbePortDiscovery {
    host: String,
    candidates: Vec<u16>,
    scan_span: u16,
}

impl Default for ProbePortDiscovery {
    fn default() -> Self {
        Self::new(DEFAULT_HOST)
    }
}

impl ProbePortDiscovery {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            candidates: Vec::new(),
            scan_span: DEFAULT_SCAN_SPAN,
        }
    }

    pub fn with_candidates(mut self, candidates: Vec<u16>) -> Self {
        self.candidates = candidates;
        self
    }

    pub fn with_scan_span(mut self, scan_span: u16) -> Self {
        self.scan_span = scan_span;
        self
    }

    fn ports_for(&self, launcher_port: u16) -> Vec<u16> {
        if !self.candidates.is_empty() {
            return self.candidates.clone();
        }
        let first = launcher_port.saturating_add(1);
        let last = launcher_port.saturating_add(self.scan_span);
        if first <= launcher_port {
            return Vec::new();
        }
        (first..=last).collect()
    }
}

#[async_trait]
impl PortDiscovery for ProbePortDiscovery {
    async fn discover_instance_port(&self, launcher_port: u16) -> Option<u16> {
        for port in self.ports_for(launcher_port) {
            match discover_targets(port, &self.host).await {
                Ok(targets) => {
                    debug!("Port {} is live ({} target(s))", port, targets.len());
                    return Some(port);
                }
                Err(e) => trace!("Port {} not live: {}", port, e),
            }
        }
        None
    }
}

#[cfg(test)]
#[path = "discovery_tests.rs"]
mod tests;
