//! CDP protocol types and message definitions.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One debuggable view exposed by the `/json/list` endpoint.
///
/// Parsed without validation: absent fields default to empty strings so a
/// malformed entry simply never matches anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Target {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type", default)]
    pub target_type: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub web_socket_debugger_url: Option<String>,
}

impl Target {
    /// Whether this target is a regular page (as opposed to a worker, iframe, ...).
    pub fn is_page(&self) -> bool {
        self.target_type == "page"
    }
}

/// CDP request message.
#[derive(Debug, Serialize)]
pub struct CdpRequest<'a> {
    pub id: u64,
    pub method: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

/// Any frame arriving from the remote side: a response if `id` is set,
/// an event if `method` is set.
#[derive(Debug, Deserialize)]
pub struct CdpMessage {
    pub id: Option<u64>,
    pub result: Option<Value>,
    pub error: Option<CdpErrorResponse>,
    pub method: Option<String>,
    pub params: Option<Value>,
}

/// CDP error in response.
#[derive(Debug, Deserialize)]
pub struct CdpErrorResponse {
    pub code: i64,
    pub message: String,
    pub data: Option<String>,
}

/// Exception details from `Runtime.evaluate`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExceptionDetails {
    #[serde(default)]
    pub text: String,
    pub line_number: Option<i64>,
    pub column_number: Option<i64>,
    pub exception: Option<RemoteObject>,
}

impl ExceptionDetails {
    /// Best human-readable description of the thrown value.
    pub fn message(&self) -> String {
        match self.exception.as_ref().and_then(|e| e.description.as_deref()) {
            Some(description) => description.to_string(),
            None if !self.text.is_empty() => self.text.clone(),
            None => "Unknown error".to_string(),
        }
    }
}

/// Remote object from the Runtime domain.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteObject {
    #[serde(rename = "type")]
    pub object_type: String,
    pub subtype: Option<String>,
    pub value: Option<Value>,
    pub description: Option<String>,
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
