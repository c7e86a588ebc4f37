//! External process launcher.

use async_trait::async_trait;
use thiserror::Error;

/// Failure reported by a [`Launcher`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LaunchError {
    /// The launcher's bookkeeping says the instance is already up.
    #[error("Instance for account {account_id} is already running")]
    AlreadyRunning { account_id: String },

    #[error("Launcher failed for account {account_id}: {message}")]
    Failed { account_id: String, message: String },
}

impl LaunchError {
    pub fn failed(account_id: impl Into<String>, message: impl Into<String>) -> Self {
        LaunchError::Failed {
            account_id: account_id.into(),
            message: message.into(),
        }
    }

    pub fn is_already_running(&self) -> bool {
        matches!(self, LaunchError::AlreadyRunning { .. })
    }
}

/// Starts and stops the remote process for one account.
///
/// Borrowed by the orchestrator for the duration of a single call.
#[async_trait]
pub trait Launcher: Send + Sync {
    async fn start_instance(&self, account_id: &str) -> Result<(), LaunchError>;

    async fn stop_instance(&self, account_id: &str) -> Result<(), LaunchError>;
}
