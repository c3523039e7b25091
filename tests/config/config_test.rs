//! Coverage for config parsing and path resolution.

use std::fs;

use sysctl_tree::config::{config_dir, config_path, load_config, Config, OutputFormat};

#[test]
fn config_path_is_inside_config_dir() {
    let dir = match config_dir() {
        Ok(dir) => dir,
        Err(err) => panic!("config dir should resolve: {err}"),
    };
    let path = config_path().expect("path");
    assert_eq!(path, dir.join("config.toml"));
}

#[test]
fn load_full_config_from_disk() {
    let tmp = tempfile::tempdir().expect("should create temp dir");
    let path = tmp.path().join("config.toml");
    fs::write(
        &path,
        r#"
[query]
max_buffer_bytes = 1048576
headroom_bytes = 64
probe_doubling = false

[policy]
reject_tuneable_writes = true

[output]
format = "json"
show_type = true

[logging]
level = "debug"
"#,
    )
    .expect("write config");

    let config = load_config(&path).expect("should load");
    assert_eq!(config.query.max_buffer_bytes, 1_048_576);
    assert_eq!(config.query.headroom_bytes, 64);
    assert!(!config.query.probe_doubling);
    assert!(config.policy.reject_tuneable_writes);
    assert_eq!(config.output.format, OutputFormat::Json);
    assert!(config.output.show_type);
    assert_eq!(config.logging.level, "debug");
}

#[test]
fn missing_file_is_an_error() {
    let tmp = tempfile::tempdir().expect("should create temp dir");
    let err = load_config(&tmp.path().join("absent.toml")).expect_err("missing");
    assert!(err.to_string().contains("failed to read config"));
}

#[test]
fn invalid_toml_is_an_error() {
    let tmp = tempfile::tempdir().expect("should create temp dir");
    let path = tmp.path().join("config.toml");
    fs::write(&path, "[output]\nformat = \"yaml\"\n").expect("write config");
    let err = load_config(&path).expect_err("bad format");
    assert!(err.to_string().contains("failed to parse config"));
}

#[test]
fn defaults_match_an_empty_file() {
    let parsed: Config = toml::from_str("").expect("should parse");
    let default = Config::default();
    assert_eq!(parsed.query, default.query);
    assert_eq!(parsed.policy, default.policy);
    assert_eq!(parsed.output.format, default.output.format);
    assert_eq!(parsed.logging.level, default.logging.level);
}
