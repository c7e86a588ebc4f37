//! DevTools target discovery and protocol client for Helmsman.
//!
//! The remote application exposes a Chrome-DevTools-style debugging surface:
//! an HTTP endpoint listing its views (`/json/list`) and one WebSocket per
//! view carrying JSON-RPC frames.
//!
//! ```rust,ignore
//! let targets = discover_targets(9222, DEFAULT_HOST).await?;
//! let client = CdpClient::connect(&ClientOptions::new(9222), &targets[0].id).await?;
//! let title = client.evaluate("document.title", true).await?;
//! client.disconnect().await;
//! ```

mod client;
mod discovery;
mod error;
mod protocol;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use client::{CdpClient, ClientOptions, EventWaiter};
pub use discovery::{DEFAULT_HOST, DISCOVERY_TIMEOUT, discover_targets};
pub use error::CdpError;
pub use protocol::{CdpErrorResponse, CdpMessage, CdpRequest, ExceptionDetails, RemoteObject, Target};
