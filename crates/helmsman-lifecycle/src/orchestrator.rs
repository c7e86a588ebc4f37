//! Idempotent start with crash recovery, and port/shutdown polling.

use std::time::Duration;

use tokio::time::Instant;
use tokio::time::error::Elapsed;
use tracing::{debug, info, warn};

use crate::discovery::PortDiscovery;
use crate::launcher::{LaunchError, Launcher};

/// Pause between port polls.
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);
/// How long to wait for a started instance to expose its port.
pub const PORT_DEADLINE: Duration = Duration::from_secs(45);
/// How long to wait for a stopped instance to release its port.
pub const SHUTDOWN_DEADLINE: Duration = Duration::from_secs(15);
/// Pause between stop and restart during recovery.
pub const RECOVERY_DELAY: Duration = Duration::from_secs(2);

/// How one start attempt resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// The instance was (re)started and its port is live.
    Started { port: u16 },
    /// The instance was already up; nothing was restarted.
    AlreadyRunning { port: u16 },
    /// The instance was started but its port never became live.
    TimedOut,
}

impl StartOutcome {
    /// The live port, if any.
    pub fn port(&self) -> Option<u16> {
        match self {
            StartOutcome::Started { port } | StartOutcome::AlreadyRunning { port } => Some(*port),
            StartOutcome::TimedOut => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifecycleTimings {
    pub poll_interval: Duration,
    pub port_deadline: Duration,
    pub shutdown_deadline: Duration,
    pub recovery_delay: Duration,
}

impl Default for LifecycleTimings {
    fn default() -> Self {
        Self {
            poll_interval: POLL_INTERVAL,
            port_deadline: PORT_DEADLINE,
            shutdown_deadline: SHUTDOWN_DEADLINE,
            recovery_delay: RECOVERY_DELAY,
        }
    }
}

/// Coordinates a [`Launcher`] and a [`PortDiscovery`].
///
/// Holds no resources of its own; the launcher is borrowed per call.
pub struct LifecycleOrchestrator<D> {
    discovery: D,
    timings: LifecycleTimings,
}

impl<D: PortDiscovery> LifecycleOrchestrator<D> {
    pub fn new(discovery: D) -> Self {
        Self::with_timings(discovery, LifecycleTimings::default())
    }

    pub fn with_timings(discovery: D, timings: LifecycleTimings) -> Self {
        Self { discovery, timings }
    }

    pub fn discovery(&self) -> &D {
        &self.discovery
    }

    pub fn timings(&self) -> &LifecycleTimings {
        &self.timings
    }

    /// Start the instance for `account_id` and wait for its port.
    ///
    /// When the launcher claims the instance is already running but no live
    /// port exists, the stale state is cleared once with stop, delay, start.
    /// Any other launcher failure is returned as is.
    pub async fn start_instance_with_recovery(
        &self,
        launcher: &dyn Launcher,
        account_id: &str,
        launcher_port: u16,
    ) -> Result<StartOutcome, LaunchError> {
        info!("Starting instance for account {}", account_id);

        match launcher.start_instance(account_id).await {
            Ok(()) => {}
            Err(e) if e.is_already_running() => {
                let deadline = Instant::now() + self.timings.port_deadline;
                if let Ok(Some(port)) = self.discover_before(launcher_port, deadline).await {
                    info!("Instance for account {} already running on port {}", account_id, port);
                    return Ok(StartOutcome::AlreadyRunning { port });
                }

                warn!(
                    "Launcher reports account {} running but no live port found, recovering",
                    account_id
                );
                launcher.stop_instance(account_id).await?;
                tokio::time::sleep(self.timings.recovery_delay).await;
                launcher.start_instance(account_id).await?;
                info!("Instance for account {} restarted after stale state", account_id);
            }
            Err(e) => return Err(e),
        }

        Ok(match self.wait_for_instance_port(launcher_port).await {
            Some(port) => StartOutcome::Started { port },
            None => {
                warn!(
                    "Instance for account {} started but no port within {:?}",
                    account_id, self.timings.port_deadline
                );
                StartOutcome::TimedOut
            }
        })
    }

    /// Poll until a live port appears or the port deadline passes.
    pub async fn wait_for_instance_port(&self, launcher_port: u16) -> Option<u16> {
        let deadline = Instant::now() + self.timings.port_deadline;
        loop {
            match self.discover_before(launcher_port, deadline).await {
                Ok(Some(port)) => {
                    info!("Instance port {} is live", port);
                    return Some(port);
                }
                Ok(None) => {}
                Err(_) => {
                    debug!("Port discovery for launcher {} overran the deadline", launcher_port);
                    return None;
                }
            }
            if !self.pause_until(deadline).await {
                return None;
            }
            debug!("Still waiting for instance port (launcher {})", launcher_port);
        }
    }

    /// Poll until no live port remains or the shutdown deadline passes.
    pub async fn wait_for_instance_shutdown(&self, launcher_port: u16) {
        let deadline = Instant::now() + self.timings.shutdown_deadline;
        loop {
            let port = match self.discover_before(launcher_port, deadline).await {
                Ok(Some(port)) => port,
                Ok(None) => {
                    info!("Instance behind launcher {} has shut down", launcher_port);
                    return;
                }
                Err(_) => {
                    warn!(
                        "Port discovery for launcher {} still running after {:?}",
                        launcher_port, self.timings.shutdown_deadline
                    );
                    return;
                }
            };
            if !self.pause_until(deadline).await {
                warn!(
                    "Instance port {} still live after {:?}",
                    port, self.timings.shutdown_deadline
                );
                return;
            }
        }
    }

    /// Stop the instance and wait for its port to go away.
    pub async fn stop_instance_and_wait(
        &self,
        launcher: &dyn Launcher,
        account_id: &str,
        launcher_port: u16,
    ) -> Result<(), LaunchError> {
        info!("Stopping instance for account {}", account_id);
        launcher.stop_instance(account_id).await?;
        self.wait_for_instance_shutdown(launcher_port).await;
        Ok(())
    }

    /// One discovery pass, cut off at `deadline`.
    async fn discover_before(
        &self,
        launcher_port: u16,
        deadline: Instant,
    ) -> Result<Option<u16>, Elapsed> {
        let remaining = deadline.saturating_duration_since(Instant::now());
        tokio::time::timeout(remaining, self.discovery.discover_instance_port(launcher_port)).await
    }

    /// Sleep one poll interval, capped at `deadline`. False once the
    /// deadline has passed.
    async fn pause_until(&self, deadline: Instant) -> bool {
        let now = Instant::now();
        if now >= deadline {
            return false;
        }
        tokio::time::sleep(self.timings.poll_interval.min(deadline - now)).await;
        true
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
