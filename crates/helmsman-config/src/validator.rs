//! Configuration validation.

use regex::Regex;

use crate::error::ConfigError;
use crate::schema::Config;

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// Collapse errors into [`ConfigError::Invalid`], handing back warnings.
    pub fn into_result(self) -> Result<Vec<ValidationWarning>, ConfigError> {
        if self.is_valid() {
            return Ok(self.warnings);
        }
        Err(ConfigError::Invalid(
            self.errors
                .iter()
                .map(|e| format!("{}: {}", e.path, e.message))
                .collect(),
        ))
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> Result<ValidationResult, ConfigError> {
        let mut result = ValidationResult::default();

        Self::validate_cdp(config, &mut result);
        Self::validate_session(config, &mut result);
        Self::validate_lifecycle(config, &mut result);
        Self::validate_logging(config, &mut result);

        Ok(result)
    }

    fn validate_cdp(config: &Config, result: &mut ValidationResult) {
        if config.cdp.host.trim().is_empty() {
            result.add_error(ValidationError::new("cdp.host", "Host cannot be empty"));
        }
        require_positive(result, "cdp.timeout_secs", config.cdp.timeout_secs);
    }

    fn validate_session(config: &Config, result: &mut ValidationResult) {
        let session = &config.session;
        require_positive(result, "session.connect_deadline_secs", session.connect_deadline_secs);
        require_positive(result, "session.poll_interval_ms", session.poll_interval_ms);
        require_positive(result, "session.action_timeout_secs", session.action_timeout_secs);
        require_positive(
            result,
            "session.health_check_timeout_secs",
            session.health_check_timeout_secs,
        );

        for (path, pattern) in [
            ("session.content_url_pattern", &session.content_url_pattern),
            ("session.control_url_pattern", &session.control_url_pattern),
            ("session.profile_url_pattern", &session.profile_url_pattern),
        ] {
            if let Err(e) = Regex::new(pattern) {
                result.add_error(ValidationError::new(path, format!("Invalid regex: {}", e)));
            }
        }

        if session.bridge_function.trim().is_empty() {
            result.add_error(ValidationError::new(
                "session.bridge_function",
                "Bridge function cannot be empty",
            ));
        }

        if session.action_timeout() < config.cdp.timeout() {
            result.add_warning(ValidationWarning::new(
                "session.action_timeout_secs",
                format!(
                    "Action timeout ({}s) is shorter than the protocol timeout ({}s)",
                    session.action_timeout_secs, config.cdp.timeout_secs
                ),
            ));
        }
    }

    fn validate_lifecycle(config: &Config, result: &mut ValidationResult) {
        let lifecycle = &config.lifecycle;
        require_positive(result, "lifecycle.poll_interval_ms", lifecycle.poll_interval_ms);
        require_positive(result, "lifecycle.port_deadline_secs", lifecycle.port_deadline_secs);
        require_positive(
            result,
            "lifecycle.shutdown_deadline_secs",
            lifecycle.shutdown_deadline_secs,
        );

        if lifecycle.candidate_ports.contains(&0) {
            result.add_error(ValidationError::new(
                "lifecycle.candidate_ports",
                "Port cannot be 0",
            ));
        }
        if lifecycle.candidate_ports.is_empty() && lifecycle.scan_span == 0 {
            result.add_error(ValidationError::new(
                "lifecycle.scan_span",
                "scan_span must be greater than 0 when no candidate ports are set",
            ));
        }
    }

    fn validate_logging(config: &Config, result: &mut ValidationResult) {
        if config.logging.level.trim().is_empty() {
            result.add_warning(ValidationWarning::new(
                "logging.level",
                "Log level is empty, falling back to info",
            ));
        }
        if config.logging.directory.is_some() && config.logging.max_files == 0 {
            result.add_warning(ValidationWarning::new(
                "logging.max_files",
                "max_files is 0, rotated log files will never be pruned",
            ));
        }
    }
}

fn require_positive(result: &mut ValidationResult, path: &str, value: u64) {
    if value == 0 {
        result.add_error(ValidationError::new(path, "must be greater than 0"));
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
