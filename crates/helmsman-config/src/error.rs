//! Configuration errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(String),

    #[error("Invalid config format: {0}")]
    InvalidFormat(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Environment variable not set: {0}")]
    EnvVarNotSet(String),

    /// Validation failed; one entry per offending field.
    #[error("Invalid configuration: {}", .0.join("; "))]
    Invalid(Vec<String>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_error() {
        let err = ConfigError::NotFound("helmsman.toml".to_string());
        assert!(err.to_string().contains("helmsman.toml"));
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_invalid_value_error() {
        let err = ConfigError::InvalidValue {
            field: "session.content_url_pattern".to_string(),
            message: "unclosed group".to_string(),
        };
        let display = err.to_string();
        assert!(display.contains("session.content_url_pattern"));
        assert!(display.contains("unclosed group"));
    }

    #[test]
    fn test_env_var_not_set_error() {
        let err = ConfigError::EnvVarNotSet("HELMSMAN_HOST".to_string());
        assert!(err.to_string().contains("HELMSMAN_HOST"));
        assert!(err.to_string().contains("not set"));
    }

    #[test]
    fn test_invalid_joins_problems() {
        let err = ConfigError::Invalid(vec![
            "cdp.host: Host cannot be empty".to_string(),
            "cdp.timeout_secs: must be greater than 0".to_string(),
        ]);
        assert_eq!(
            err.to_string(),
            "Invalid configuration: cdp.host: Host cannot be empty; cdp.timeout_secs: must be greater than 0"
        );
    }

    #[test]
    fn test_io_error_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = ConfigError::from(io_err);
        assert!(err.to_string().contains("denied"));
    }
}
