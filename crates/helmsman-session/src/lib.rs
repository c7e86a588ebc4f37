//! Paired session over one remote instance.
//!
//! Each instance runs two views: the content view rendering the external
//! site and the control view hosting the local application shell. An
//! [`InstanceSession`] discovers both, holds one protocol client per view
//! and exposes the high-level operations: profile navigation, bridged
//! actions and raw UI evaluation, each followed by an optional health check.

mod action;
mod error;
mod health;
mod options;
mod rules;
mod session;

pub use action::ActionResult;
pub use error::SessionError;
pub use health::{HealthCheck, HealthCheckError};
pub use options::{
    ACTION_TIMEOUT, CONNECT_DEADLINE, DEFAULT_BRIDGE_FUNCTION, HEALTH_CHECK_TIMEOUT, POLL_INTERVAL,
    SessionOptions,
};
pub use rules::{TargetRole, TargetRules, TargetSelection};
pub use session::InstanceSession;
