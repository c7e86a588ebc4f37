//! Process lifecycle coordination for Helmsman.
//!
//! The remote process is started and stopped by an external [`Launcher`].
//! [`LifecycleOrchestrator`] makes starting idempotent, recovers once from
//! stale "already running" bookkeeping left by a crash, and polls a
//! [`PortDiscovery`] until the debugging port is live or gone.

mod discovery;
mod launcher;
mod orchestrator;

pub use discovery::{DEFAULT_SCAN_SPAN, PortDiscovery, ProbePortDiscovery};
pub use launcher::{LaunchError, Launcher};
pub use orchestrator::{
    LifecycleOrchestrator, LifecycleTimings, POLL_INTERVAL, PORT_DEADLINE, RECOVERY_DELAY,
    SHUTDOWN_DEADLINE, StartOutcome,
};
