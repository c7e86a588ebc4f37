//! Action results.

use serde::{Deserialize, Serialize};

/// Outcome of one remote action, handed to downstream stores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionResult {
    pub success: bool,
    pub action_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ActionResult {
    pub fn succeeded(action_type: impl Into<String>) -> Self {
        Self {
            success: true,
            action_type: action_type.into(),
            error: None,
        }
    }

    pub fn failed(action_type: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            action_type: action_type.into(),
            error: Some(error.into()),
        }
    }
}
