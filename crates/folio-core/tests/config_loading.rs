//! Loading pipeline configuration from disk

use folio_core::{ConfigError, PipelineConfig, ReviewHandling};
use folio_snapshot::ReviewPolicy;
use pretty_assertions::assert_eq;
use std::io::Write;
use std::time::Duration;

#[test]
fn load_full_config_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
pass_count = 6
collaborator_timeout_secs = 30
review_handling = "revert"

[retry]
max_attempts = 4
initial_backoff_ms = 250
max_backoff_ms = 2000
multiplier = 3.0

[review]
auto_accept_net_threshold = 3

[logging]
level = "folio_core=debug,info"
json = true

[validator]
auto_fix = false
"#
    )
    .unwrap();

    let config = PipelineConfig::load(file.path()).unwrap();

    assert_eq!(config.pass_count, 6);
    assert_eq!(config.collaborator_timeout(), Duration::from_secs(30));
    assert_eq!(config.review_handling, ReviewHandling::Revert);
    assert_eq!(config.review, ReviewPolicy::auto_accept_at(3));
    assert_eq!(config.retry.max_attempts, 4);
    assert_eq!(config.retry.backoff(2), Duration::from_millis(750));
    assert_eq!(config.logging.level, "folio_core=debug,info");
    assert!(config.logging.json);
    assert!(!config.validator.auto_fix);
}

#[test]
fn missing_file_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");

    let err = PipelineConfig::load(&path).unwrap_err();

    match err {
        ConfigError::Io { path: reported, .. } => assert_eq!(reported, path),
        other => panic!("expected io error, got {other:?}"),
    }
}

#[test]
fn invalid_file_is_rejected() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[retry]\nmax_backoff_ms = 10\ninitial_backoff_ms = 100").unwrap();

    let err = PipelineConfig::load(file.path()).unwrap_err();
    assert!(matches!(
        err,
        ConfigError::Invalid {
            field: "retry.max_backoff_ms",
            ..
        }
    ));
}
