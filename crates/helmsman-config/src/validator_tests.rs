use super::*;

#[test]
fn test_validate_default_config() {
    let config = Config::default();
    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.is_valid());
    assert!(result.warnings.is_empty());
}

#[test]
fn test_validate_empty_host() {
    let mut config = Config::default();
    config.cdp.host = "  ".to_string();

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(!result.is_valid());
    assert!(result.errors.iter().any(|e| e.path == "cdp.host"));
}

#[test]
fn test_validate_zero_durations() {
    let mut config = Config::default();
    config.cdp.timeout_secs = 0;
    config.session.poll_interval_ms = 0;
    config.lifecycle.port_deadline_secs = 0;

    let result = ConfigValidator::validate(&config).unwrap();
    let paths: Vec<&str> = result.errors.iter().map(|e| e.path.as_str()).collect();
    assert!(paths.contains(&"cdp.timeout_secs"));
    assert!(paths.contains(&"session.poll_interval_ms"));
    assert!(paths.contains(&"lifecycle.port_deadline_secs"));
}

#[test]
fn test_validate_bad_pattern() {
    let mut config = Config::default();
    config.session.control_url_pattern = "^(file|app://".to_string();

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(!result.is_valid());
    let error = result
        .errors
        .iter()
        .find(|e| e.path == "session.control_url_pattern")
        .unwrap();
    assert!(error.message.starts_with("Invalid regex"));
}

#[test]
fn test_validate_short_action_timeout_warns() {
    let mut config = Config::default();
    config.session.action_timeout_secs = 10;

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.is_valid());
    assert!(
        result
            .warnings
            .iter()
            .any(|w| w.path == "session.action_timeout_secs")
    );
}

#[test]
fn test_validate_zero_candidate_port() {
    let mut config = Config::default();
    config.lifecycle.candidate_ports = vec![9222, 0];

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.errors.iter().any(|e| e.path == "lifecycle.candidate_ports"));
}

#[test]
fn test_validate_zero_scan_span_without_candidates() {
    let mut config = Config::default();
    config.lifecycle.scan_span = 0;
    let result = ConfigValidator::validate(&config).unwrap();
    assert!(!result.is_valid());

    config.lifecycle.candidate_ports = vec![9222];
    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.is_valid());
}

#[test]
fn test_into_result() {
    let config = Config::default();
    let warnings = ConfigValidator::validate(&config)
        .unwrap()
        .into_result()
        .unwrap();
    assert!(warnings.is_empty());

    let mut config = Config::default();
    config.cdp.host = String::new();
    let err = ConfigValidator::validate(&config)
        .unwrap()
        .into_result()
        .unwrap_err();
    match err {
        ConfigError::Invalid(problems) => {
            assert_eq!(problems, vec!["cdp.host: Host cannot be empty".to_string()]);
        }
        other => panic!("expected Invalid, got {:?}", other),
    }
}
