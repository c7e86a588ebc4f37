//! Runtime options built from loaded configuration.

use helmsman_cdp::ClientOptions;
use helmsman_config::{CdpConfig, Config, ConfigError, LifecycleConfig, SessionConfig};
use helmsman_lifecycle::{LifecycleTimings, ProbePortDiscovery};
use helmsman_session::{SessionOptions, TargetRules};
use regex::Regex;

/// Protocol client options for the instance listening on `port`.
pub fn client_options(config: &CdpConfig, port: u16) -> ClientOptions {
    ClientOptions {
        host: config.host.clone(),
        port,
        timeout: config.timeout(),
        remote: config.remote,
    }
}

/// Compile the session's URL patterns, naming the field that fails.
pub fn target_rules(config: &SessionConfig) -> Result<TargetRules, ConfigError> {
    Ok(TargetRules::from_regexes(
        compile("session.content_url_pattern", &config.content_url_pattern)?,
        compile("session.control_url_pattern", &config.control_url_pattern)?,
        compile("session.profile_url_pattern", &config.profile_url_pattern)?,
    ))
}

fn compile(field: &str, pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(pattern).map_err(|e| ConfigError::InvalidValue {
        field: field.to_string(),
        message: e.to_string(),
    })
}

/// Session options for the instance listening on `port`.
pub fn session_options(config: &Config, port: u16) -> Result<SessionOptions, ConfigError> {
    let session = &config.session;
    let mut options = SessionOptions::new(client_options(&config.cdp, port), target_rules(session)?)
        .with_connect_deadline(session.connect_deadline(), session.poll_interval())
        .with_action_timeout(session.action_timeout())
        .with_health_check_timeout(session.health_check_timeout());
    options.bridge_function = session.bridge_function.clone();
    Ok(options)
}

pub fn lifecycle_timings(config: &LifecycleConfig) -> LifecycleTimings {
    LifecycleTimings {
        poll_interval: config.poll_interval(),
        port_deadline: config.port_deadline(),
        shutdown_deadline: config.shutdown_deadline(),
        recovery_delay: config.recovery_delay(),
    }
}

/// Port discovery probing the configured candidates on the protocol host.
pub fn port_discovery(config: &Config) -> ProbePortDiscovery {
    ProbePortDiscovery::new(config.cdp.host.clone())
        .with_candidates(config.lifecycle.candidate_ports.clone())
        .with_scan_span(config.lifecycle.scan_span)
}
