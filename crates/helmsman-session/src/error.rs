//! Session errors.

use helmsman_cdp::CdpError;
use thiserror::Error;

use crate::rules::TargetRole;

/// Errors raised by [`InstanceSession`](crate::InstanceSession).
#[derive(Debug, Error)]
pub enum SessionError {
    /// The expected views never showed up before the connect deadline.
    #[error(
        "Remote instance is not running: {} never appeared ({observed} target(s) observed)",
        describe_roles(.missing)
    )]
    NotRunning {
        missing: Vec<TargetRole>,
        observed: usize,
    },

    /// The URL does not have the expected profile shape.
    #[error("Invalid target URL: {0}")]
    InvalidTargetUrl(String),

    /// A remote action failed. The protocol-level cause is kept as `source`.
    #[error("Action '{action}' failed: {message}")]
    ActionExecution {
        action: String,
        message: String,
        #[source]
        source: CdpError,
    },

    /// The health check detected a blocking UI condition.
    #[error("UI blocked: {0}")]
    UiBlocked(String),

    /// The session has no live clients.
    #[error("Session is not connected")]
    NotConnected,

    /// Discovery or transport failure, propagated unchanged.
    #[error(transparent)]
    Cdp(#[from] CdpError),
}

fn describe_roles(roles: &[TargetRole]) -> String {
    roles
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" and ")
}
