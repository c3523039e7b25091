//! End-to-end runs of the `sysctl-tree` binary.

use assert_cmd::Command;
use tempfile::TempDir;

/// Command with an empty config file and the mock namespace.
fn sysctl_tree(tmp: &TempDir) -> Command {
    let config = tmp.path().join("config.toml");
    std::fs::write(&config, "").expect("write config");
    let mut cmd = Command::cargo_bin("sysctl-tree").expect("binary should build");
    cmd.arg("--mock").arg("--config").arg(config).env_remove("RUST_LOG");
    cmd
}

fn stdout_of(cmd: &mut Command) -> String {
    let output = cmd.output().expect("should run");
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).expect("utf-8 output")
}

#[test]
fn oid_prints_the_numeric_path() {
    let tmp = tempfile::tempdir().expect("temp dir");
    sysctl_tree(&tmp)
        .args(["oid", "kern.hostname"])
        .assert()
        .success()
        .stdout("kern.hostname: 1.10\n");
}

#[test]
fn get_prints_name_and_value() {
    let tmp = tempfile::tempdir().expect("temp dir");
    sysctl_tree(&tmp)
        .args(["get", "hw.ncpu", "kern.ostype"])
        .assert()
        .success()
        .stdout("hw.ncpu: 8\nkern.ostype: FreeBSD\n");
}

#[test]
fn get_on_interior_node_prints_the_subtree() {
    let tmp = tempfile::tempdir().expect("temp dir");
    sysctl_tree(&tmp)
        .args(["get", "kern.ipc"])
        .assert()
        .success()
        .stdout("kern.ipc.maxsockbuf: 2097152\nkern.ipc.soacceptqueue: 4096\n");
}

#[test]
fn get_with_type() {
    let tmp = tempfile::tempdir().expect("temp dir");
    sysctl_tree(&tmp)
        .args(["get", "-t", "kern.securelevel"])
        .assert()
        .success()
        .stdout("kern.securelevel: -1 (integer)\n");
}

#[test]
fn get_unknown_name_fails() {
    let tmp = tempfile::tempdir().expect("temp dir");
    let output = sysctl_tree(&tmp)
        .args(["get", "totally.bogus.name"])
        .output()
        .expect("should run");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown oid"));
}

#[test]
fn get_json_is_parseable() {
    let tmp = tempfile::tempdir().expect("temp dir");
    let stdout = stdout_of(sysctl_tree(&tmp).args(["get", "--json", "kern.clockrate"]));
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("valid json");
    assert_eq!(parsed[0]["name"], "kern.clockrate");
    assert_eq!(parsed[0]["format"], "S,clockinfo");
    assert_eq!(parsed[0]["value"]["hz"], 1000);
    assert_eq!(parsed[0]["value"]["stathz"], 127);
}

#[test]
fn list_names_only() {
    let tmp = tempfile::tempdir().expect("temp dir");
    sysctl_tree(&tmp)
        .args(["list", "-N", "hw"])
        .assert()
        .success()
        .stdout("hw.machine\nhw.ncpu\nhw.physmem\nhw.pagesizes\n");
}

#[test]
fn list_writable_with_pattern() {
    let tmp = tempfile::tempdir().expect("temp dir");
    sysctl_tree(&tmp)
        .args(["list", "-W", "--match", "host", "kern"])
        .assert()
        .success()
        .stdout("kern.hostname: mock.local\n");
}

#[test]
fn list_everything() {
    let tmp = tempfile::tempdir().expect("temp dir");
    let stdout = stdout_of(sysctl_tree(&tmp).args(["list", "-N"]));
    assert_eq!(stdout.lines().count(), 17);
    assert_eq!(stdout.lines().next(), Some("kern.ostype"));
}

#[test]
fn describe_prints_the_description() {
    let tmp = tempfile::tempdir().expect("temp dir");
    sysctl_tree(&tmp)
        .args(["describe", "kern.maxfiles"])
        .assert()
        .success()
        .stdout("kern.maxfiles: Maximum number of files\n");
}

#[test]
fn set_reports_old_and_new_value() {
    let tmp = tempfile::tempdir().expect("temp dir");
    sysctl_tree(&tmp)
        .args(["set", "kern.hostname=build01"])
        .assert()
        .success()
        .stdout("kern.hostname: mock.local -> build01\n");
}

#[test]
fn set_read_only_fails() {
    let tmp = tempfile::tempdir().expect("temp dir");
    let output = sysctl_tree(&tmp)
        .args(["set", "hw.ncpu=4"])
        .output()
        .expect("should run");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("failed to set hw.ncpu"));
}

#[test]
fn set_without_equals_fails() {
    let tmp = tempfile::tempdir().expect("temp dir");
    let output = sysctl_tree(&tmp)
        .args(["set", "kern.hostname"])
        .output()
        .expect("should run");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("expected NAME=VALUE"));
}
