//! Config file loading through the `run` arguments.

use std::io::Write;

use releaser_cli::config::{ConfigError, FileConfig};
use releaser_cli::run::RunArgs;

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn file_values_are_used_when_flags_are_absent() {
    let file = write_config(
        "repository: tool\n\
         repository_owner: acme\n\
         hostname: mirror-1\n\
         domain: get.example.com\n\
         binary: tool\n\
         tls: true\n",
    );
    let args = RunArgs {
        config: Some(file.path().to_path_buf()),
        ..RunArgs::default()
    };

    let config = args.resolve().unwrap();
    assert_eq!(config.repository, "tool");
    assert_eq!(config.domain, "get.example.com");
    assert!(config.tls);
}

#[test]
fn flags_override_file_values() {
    let file = write_config(
        "repository: tool\nrepository_owner: acme\nhostname: mirror-1\nbinary: from-file\n",
    );
    let args = RunArgs {
        config: Some(file.path().to_path_buf()),
        binary: Some("from-flag".into()),
        tls: Some(false),
        ..RunArgs::default()
    };

    let config = args.resolve().unwrap();
    assert_eq!(config.binary, "from-flag");
    assert!(!config.tls);
}

#[test]
fn missing_file_is_read_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.yml");
    assert!(matches!(
        FileConfig::load(&path),
        Err(ConfigError::Read { .. })
    ));
}

#[test]
fn malformed_file_is_parse_error() {
    let file = write_config("repository: [unterminated\n");
    match FileConfig::load(file.path()) {
        Err(ConfigError::Parse { path, .. }) => assert_eq!(path, file.path()),
        other => panic!("expected Parse error, got: {other:?}"),
    }
}

#[test]
fn file_without_required_fields_fails_validation() {
    let file = write_config("domain: get.example.com\n");
    let args = RunArgs {
        config: Some(file.path().to_path_buf()),
        ..RunArgs::default()
    };
    let err = args.resolve().unwrap_err();
    assert!(err.to_string().contains("repository is required"), "got: {err}");
}
