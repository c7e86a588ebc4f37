//! Configuration schema definitions.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub cdp: CdpConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub lifecycle: LifecycleConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Protocol client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CdpConfig {
    /// Host serving discovery and WebSocket endpoints.
    #[serde(default = "default_host")]
    pub host: String,

    /// Per-call protocol timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Connect to the advertised `webSocketDebuggerUrl` instead of
    /// building the URL from host and port.
    #[serde(default)]
    pub remote: bool,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for CdpConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            timeout_secs: default_timeout_secs(),
            remote: false,
        }
    }
}

impl CdpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Instance session configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// How long `connect` polls for both views.
    #[serde(default = "default_connect_deadline_secs")]
    pub connect_deadline_secs: u64,

    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Budget for one bridged action. Actions may run for minutes.
    #[serde(default = "default_action_timeout_secs")]
    pub action_timeout_secs: u64,

    #[serde(default = "default_health_check_timeout_secs")]
    pub health_check_timeout_secs: u64,

    /// Regex matching the content view URL.
    #[serde(default = "default_content_url_pattern")]
    pub content_url_pattern: String,

    /// Regex matching the control view URL.
    #[serde(default = "default_control_url_pattern")]
    pub control_url_pattern: String,

    /// Regex a URL must match before `navigate_to_profile` accepts it.
    #[serde(default = "default_profile_url_pattern")]
    pub profile_url_pattern: String,

    /// Remote function called as `f(name, config)` by `execute_action`.
    #[serde(default = "default_bridge_function")]
    pub bridge_function: String,
}

fn default_connect_deadline_secs() -> u64 {
    30
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_action_timeout_secs() -> u64 {
    600
}

fn default_health_check_timeout_secs() -> u64 {
    10
}

fn default_content_url_pattern() -> String {
    r"^https://([a-z0-9-]+\.)*linkedin\.com/".to_string()
}

fn default_control_url_pattern() -> String {
    "^(file|app)://".to_string()
}

fn default_profile_url_pattern() -> String {
    r"^https://(www\.)?linkedin\.com/in/[^/?#]+/?([?#].*)?$".to_string()
}

fn default_bridge_function() -> String {
    "window.automation.executeAction".to_string()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            connect_deadline_secs: default_connect_deadline_secs(),
            poll_interval_ms: default_poll_interval_ms(),
            action_timeout_secs: default_action_timeout_secs(),
            health_check_timeout_secs: default_health_check_timeout_secs(),
            content_url_pattern: default_content_url_pattern(),
            control_url_pattern: default_control_url_pattern(),
            profile_url_pattern: default_profile_url_pattern(),
            bridge_function: default_bridge_function(),
        }
    }
}

impl SessionConfig {
    pub fn connect_deadline(&self) -> Duration {
        Duration::from_secs(self.connect_deadline_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn action_timeout(&self) -> Duration {
        Duration::from_secs(self.action_timeout_secs)
    }

    pub fn health_check_timeout(&self) -> Duration {
        Duration::from_secs(self.health_check_timeout_secs)
    }
}

/// Lifecycle orchestrator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifecycleConfig {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// How long to wait for a started instance's port.
    #[serde(default = "default_port_deadline_secs")]
    pub port_deadline_secs: u64,

    /// How long to wait for a stopped instance to release its port.
    #[serde(default = "default_shutdown_deadline_secs")]
    pub shutdown_deadline_secs: u64,

    /// Pause between stop and restart when recovering stale state.
    #[serde(default = "default_recovery_delay_secs")]
    pub recovery_delay_secs: u64,

    /// Ports probed for a live instance. Empty means scan above the
    /// launcher port.
    #[serde(default)]
    pub candidate_ports: Vec<u16>,

    #[serde(default = "default_scan_span")]
    pub scan_span: u16,
}

fn default_port_deadline_secs() -> u64 {
    45
}

fn default_shutdown_deadline_secs() -> u64 {
    15
}

fn default_recovery_delay_secs() -> u64 {
    2
}

fn default_scan_span() -> u16 {
    16
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            port_deadline_secs: default_port_deadline_secs(),
            shutdown_deadline_secs: default_shutdown_deadline_secs(),
            recovery_delay_secs: default_recovery_delay_secs(),
            candidate_ports: Vec::new(),
            scan_span: default_scan_span(),
        }
    }
}

impl LifecycleConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn port_deadline(&self) -> Duration {
        Duration::from_secs(self.port_deadline_secs)
    }

    pub fn shutdown_deadline(&self) -> Duration {
        Duration::from_secs(self.shutdown_deadline_secs)
    }

    pub fn recovery_delay(&self) -> Duration {
        Duration::from_secs(self.recovery_delay_secs)
    }
}

/// Console output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,

    /// Directory for daily-rotated log files. No file sink when unset.
    #[serde(default)]
    pub directory: Option<PathBuf>,

    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,

    /// Rotated files kept on disk.
    #[serde(default = "default_max_files")]
    pub max_files: usize,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_file_prefix() -> String {
    "helmsman".to_string()
}

fn default_max_files() -> usize {
    7
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
            directory: None,
            file_prefix: default_file_prefix(),
            max_files: default_max_files(),
        }
    }
}

impl LoggingConfig {
    /// Log directory with `~` expanded.
    pub fn log_dir(&self) -> Option<PathBuf> {
        self.directory
            .as_ref()
            .map(|dir| PathBuf::from(shellexpand::tilde(&dir.to_string_lossy()).as_ref()))
    }
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
