use meteor_common::{LoadTestConfig, MeteorError, OutputFormat, Target};
use std::time::Duration;

fn valid() -> LoadTestConfig {
    LoadTestConfig {
        targets: vec![Target::new("http://127.0.0.1:8080/", 1.0)],
        requests_per_second: 10,
        concurrency: 2,
        duration_seconds: 3,
    }
}

fn invalid_reason(config: &LoadTestConfig) -> String {
    match config.validate() {
        Err(MeteorError::InvalidConfig(reason)) => reason,
        other => panic!("expected InvalidConfig, got {other:?}"),
    }
}

#[test]
fn test_valid_config_passes() {
    assert!(valid().validate().is_ok());
}

#[test]
fn test_zero_rps_rejected() {
    let config = LoadTestConfig { requests_per_second: 0, ..valid() };
    assert_eq!(invalid_reason(&config), "rps must be greater than 0");
}

#[test]
fn test_zero_concurrency_rejected() {
    let config = LoadTestConfig { concurrency: 0, ..valid() };
    assert_eq!(invalid_reason(&config), "concurrency must be greater than 0");
}

#[test]
fn test_zero_duration_rejected() {
    let config = LoadTestConfig { duration_seconds: 0, ..valid() };
    assert_eq!(invalid_reason(&config), "duration must be greater than 0");
}

#[test]
fn test_empty_targets_rejected() {
    let config = LoadTestConfig { targets: vec![], ..valid() };
    assert_eq!(invalid_reason(&config), "at least one endpoint must be specified");
}

#[test]
fn test_nominal_cap_and_duration() {
    let config = valid();
    assert_eq!(config.nominal_cap(), 30);
    assert_eq!(config.duration(), Duration::from_secs(3));

    // No overflow at the top of the u32 range.
    let big = LoadTestConfig { requests_per_second: u32::MAX, duration_seconds: u32::MAX, ..valid() };
    assert_eq!(big.nominal_cap(), u64::from(u32::MAX) * u64::from(u32::MAX));
}

#[test]
fn test_output_format_names_roundtrip() {
    for (name, expected) in [("html", OutputFormat::Html), ("json", OutputFormat::Json)] {
        assert_eq!(OutputFormat::from_name(name), Some(expected), "from_name({name:?}) failed");
        assert_eq!(expected.as_name(), name, "as_name() mismatch for {name:?}");
    }
    assert!(OutputFormat::from_name("xml").is_none());
    assert_eq!(OutputFormat::default(), OutputFormat::Html);
}

#[test]
fn test_target_weight_defaults_when_omitted_in_json() {
    let parsed: Target = serde_json::from_str(r#"{"url":"http://a/"}"#).unwrap();
    assert_eq!(parsed, Target::new("http://a/", 1.0));
}
