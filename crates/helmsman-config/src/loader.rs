//! Configuration loader.

use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;

use crate::error::ConfigError;
use crate::schema::Config;

/// Configuration loader with environment variable substitution.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let content = fs::read_to_string(path)?;
        Self::load_str(&content)
    }

    /// Load configuration from a string.
    pub fn load_str(content: &str) -> Result<Config, ConfigError> {
        let expanded = Self::expand_env_vars(content)?;
        let config: Config = toml::from_str(&expanded)?;
        Ok(config)
    }

    /// Load `path` if given, else the default location if it exists, else
    /// built-in defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Config, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::load(&path),
                _ => Ok(Config::default()),
            },
        }
    }

    /// `~/.helmsman/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".helmsman").join("config.toml"))
    }

    /// Expand environment variables in the format `${VAR}`.
    fn expand_env_vars(content: &str) -> Result<String, ConfigError> {
        let re = Regex::new(r"\$\{([^}]+)\}")
            .map_err(|e| ConfigError::InvalidFormat(e.to_string()))?;
        let mut result = content.to_string();

        for cap in re.captures_iter(content) {
            let var_name = &cap[1];
            let var_value = std::env::var(var_name)
                .map_err(|_| ConfigError::EnvVarNotSet(var_name.to_string()))?;
            result = result.replace(&cap[0], &var_value);
        }

        Ok(result)
    }

    /// Expand shell-style paths (e.g., `~/.helmsman`).
    pub fn expand_path(path: &str) -> String {
        shellexpand::tilde(path).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_empty_config() {
        let config = ConfigLoader::load_str("").unwrap();
        assert_eq!(config.cdp.timeout_secs, 30);
        assert_eq!(config.lifecycle.port_deadline_secs, 45);
    }

    #[test]
    fn test_load_full_config() {
        let content = r#"
            [cdp]
            host = "10.0.0.5"
            timeout_secs = 20
            remote = true

            [session]
            connect_deadline_secs = 60
            poll_interval_ms = 500
            control_url_pattern = "^app://shell/"

            [lifecycle]
            candidate_ports = [9333, 9334]
            recovery_delay_secs = 5

            [logging]
            level = "helmsman=debug"
            format = "json"
            directory = "~/.helmsman/logs"
        "#;
        let config = ConfigLoader::load_str(content).unwrap();
        assert_eq!(config.cdp.host, "10.0.0.5");
        assert!(config.cdp.remote);
        assert_eq!(config.session.poll_interval_ms, 500);
        assert_eq!(config.session.control_url_pattern, "^app://shell/");
        assert_eq!(config.lifecycle.candidate_ports, vec![9333, 9334]);
        assert_eq!(config.lifecycle.recovery_delay_secs, 5);
        assert_eq!(config.logging.level, "helmsman=debug");
        assert!(config.logging.directory.is_some());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[cdp]").unwrap();
        writeln!(file, "timeout_secs = 5").unwrap();

        let config = ConfigLoader::load(file.path()).unwrap();
        assert_eq!(config.cdp.timeout_secs, 5);
    }

    #[test]
    fn test_load_nonexistent_file() {
        let err = ConfigLoader::load(Path::new("/nonexistent/path/helmsman.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_or_default_prefers_explicit_path() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[lifecycle]\nscan_span = 4").unwrap();

        let config = ConfigLoader::load_or_default(Some(file.path())).unwrap();
        assert_eq!(config.lifecycle.scan_span, 4);
    }

    #[test]
    fn test_load_invalid_toml() {
        let err = ConfigLoader::load_str("invalid = [unclosed").unwrap_err();
        assert!(matches!(err, ConfigError::TomlParse(_)));
    }

    #[test]
    fn test_load_wrong_type() {
        let result = ConfigLoader::load_str("[cdp]\ntimeout_secs = \"soon\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_expand_env_vars() {
        let path = std::env::var("PATH").unwrap();
        let expanded = ConfigLoader::expand_env_vars("value = \"${PATH}\"").unwrap();
        assert_eq!(expanded, format!("value = \"{}\"", path));
    }

    #[test]
    fn test_expand_env_vars_not_set() {
        let result = ConfigLoader::expand_env_vars("value = \"${HELMSMAN_UNSET_TEST_VAR_12345}\"");
        assert!(matches!(result, Err(ConfigError::EnvVarNotSet(name)) if name == "HELMSMAN_UNSET_TEST_VAR_12345"));
    }

    #[test]
    fn test_expand_env_vars_no_vars() {
        let content = "value = \"no variables here\"";
        let expanded = ConfigLoader::expand_env_vars(content).unwrap();
        assert_eq!(expanded, content);
    }

    #[test]
    fn test_expand_path() {
        assert_eq!(ConfigLoader::expand_path("/usr/local/bin"), "/usr/local/bin");
        let expanded = ConfigLoader::expand_path("~/test");
        assert!(!expanded.starts_with('~'));
        assert!(expanded.ends_with("/test"));
    }

    #[test]
    fn test_default_path() {
        if let Some(path) = ConfigLoader::default_path() {
            assert!(path.ends_with(".helmsman/config.toml"));
        }
    }
}
