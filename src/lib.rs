//! # Helmsman
//!
//! Supervise and drive a desktop application instance through its
//! DevTools-style debugging surface.
//!
//! - [`cdp`]: target discovery and the per-target protocol client
//! - [`session`]: the paired content/control session and its actions
//! - [`lifecycle`]: idempotent start, crash recovery and port polling
//! - [`config`]: TOML configuration
//!
//! ```rust,ignore
//! let config = ConfigLoader::load_or_default(None)?;
//! let _guard = logging::init_logging(&config.logging)?;
//!
//! let orchestrator = LifecycleOrchestrator::with_timings(
//!     settings::port_discovery(&config),
//!     settings::lifecycle_timings(&config.lifecycle),
//! );
//! let outcome = orchestrator.start_instance_with_recovery(&launcher, "acct-1", 9100).await?;
//!
//! if let Some(port) = outcome.port() {
//!     let mut session = InstanceSession::new(settings::session_options(&config, port)?);
//!     session.connect().await?;
//!     session.navigate_to_profile("https://www.example.com/in/jane-doe/").await?;
//!     let result = session.execute_action("visit_profile", None).await?;
//!     session.disconnect().await;
//! }
//! ```

pub mod logging;
pub mod settings;

pub use helmsman_cdp as cdp;
pub use helmsman_config as config;
pub use helmsman_lifecycle as lifecycle;
pub use helmsman_session as session;

pub use helmsman_cdp::{CdpClient, CdpError, ClientOptions, Target, discover_targets};
pub use helmsman_config::{ConfigError, ConfigLoader, ConfigValidator};
pub use helmsman_lifecycle::{
    LaunchError, Launcher, LifecycleOrchestrator, LifecycleTimings, PortDiscovery,
    ProbePortDiscovery, StartOutcome,
};
pub use helmsman_session::{
    ActionResult, HealthCheck, HealthCheckError, InstanceSession, SessionError, SessionOptions,
};
