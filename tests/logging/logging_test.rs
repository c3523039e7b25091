//! Tests for subscriber setup.

use sysctl_tree::logging::{env_filter, init_cli, LogFormat};

#[test]
fn default_format_is_pretty() {
    assert_eq!(LogFormat::default(), LogFormat::Pretty);
}

#[test]
fn filter_falls_back_to_default_level() {
    // RUST_LOG may be set by whoever runs the tests; only check the
    // fallback when it is not.
    if std::env::var_os("RUST_LOG").is_none() {
        assert_eq!(env_filter("debug").to_string(), "debug");
    }
}

#[test]
fn second_init_fails_cleanly() {
    // Only one global subscriber per process.
    let _first = init_cli("warn", LogFormat::Json);
    let second = init_cli("warn", LogFormat::Pretty);
    assert!(second.is_err());
}
