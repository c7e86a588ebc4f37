//! Session timing and connection options.

use std::time::Duration;

use helmsman_cdp::ClientOptions;

use crate::rules::TargetRules;

/// How long `connect()` keeps polling discovery for both views.
pub const CONNECT_DEADLINE: Duration = Duration::from_secs(30);
/// Pause between discovery polls.
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);
/// Budget for one `execute_action` bridge call.
pub const ACTION_TIMEOUT: Duration = Duration::from_secs(600);
/// Budget for one health check.
pub const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(10);
/// Remote function invoked by `execute_action` as `f(name, config)`.
pub const DEFAULT_BRIDGE_FUNCTION: &str = "window.automation.executeAction";

/// Everything an [`InstanceSession`](crate::InstanceSession) needs to reach
/// and drive one remote instance.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Shared by both clients.
    pub client: ClientOptions,
    pub rules: TargetRules,
    pub connect_deadline: Duration,
    pub poll_interval: Duration,
    pub action_timeout: Duration,
    pub health_check_timeout: Duration,
    pub bridge_function: String,
}

impl SessionOptions {
    pub fn new(client: ClientOptions, rules: TargetRules) -> Self {
        Self {
            client,
            rules,
            connect_deadline: CONNECT_DEADLINE,
            poll_interval: POLL_INTERVAL,
            action_timeout: ACTION_TIMEOUT,
            health_check_timeout: HEALTH_CHECK_TIMEOUT,
            bridge_function: DEFAULT_BRIDGE_FUNCTION.to_string(),
        }
    }

    pub fn with_connect_deadline(mut self, deadline: Duration, poll_interval: Duration) -> Self {
        self.connect_deadline = deadline;
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_action_timeout(mut self, timeout: Duration) -> Self {
        self.action_timeout = timeout;
        self
    }

    pub fn with_health_check_timeout(mut self, timeout: Duration) -> Self {
        self.health_check_timeout = timeout;
        self
    }
}
