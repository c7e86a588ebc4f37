//! # Helmsman Config
//!
//! TOML configuration for the protocol client, instance sessions, the
//! lifecycle orchestrator and logging.

mod error;
mod loader;
mod schema;
mod validator;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::*;
pub use validator::{ConfigValidator, ValidationError, ValidationResult, ValidationWarning};
