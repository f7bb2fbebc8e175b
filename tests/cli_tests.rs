//! Integration tests for the CLI interface

mod common;

use assert_cmd::Command;
use common::{pattern, TestContext};
use predicates::prelude::*;

fn streamio() -> Command {
    let mut cmd = Command::cargo_bin("streamio").unwrap();
    cmd.env_remove("STREAMIO_BUFFER_SIZE")
        .env_remove("STREAMIO_SHELL")
        .env_remove("STREAMIO_LOG_LEVEL");
    cmd
}

#[test]
fn test_cli_help_flag() {
    streamio()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("Commands:"));
}

#[test]
fn test_copy_file() {
    let ctx = TestContext::new();
    let data = pattern(20_000);
    let src = ctx.create_file("src.bin", &data);

    streamio()
        .arg("copy")
        .arg(&src)
        .arg(ctx.path("dst.bin"))
        .assert()
        .success();

    assert_eq!(ctx.read_file("dst.bin"), data);
}

#[test]
fn test_copy_append() {
    let ctx = TestContext::new();
    let src = ctx.create_file("src.txt", b"more\n");
    let dst = ctx.create_file("dst.txt", b"first\n");

    streamio()
        .args(["copy", "--append"])
        .arg(&src)
        .arg(&dst)
        .assert()
        .success();

    assert_eq!(ctx.read_file("dst.txt"), b"first\nmore\n");
}

#[test]
fn test_copy_missing_source_fails() {
    let ctx = TestContext::new();
    streamio()
        .arg("copy")
        .arg(ctx.path("absent"))
        .arg(ctx.path("dst"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to open"));
}

#[test]
fn test_run_relays_output() {
    streamio()
        .args(["run", "echo hello | tr a-z A-Z"])
        .assert()
        .success()
        .stdout("HELLO\n");
}

#[test]
fn test_run_joins_words() {
    streamio()
        .args(["run", "printf", "%s-%s", "a b", "c"])
        .assert()
        .success()
        .stdout("a b-c");
}

#[test]
fn test_run_propagates_exit_code() {
    streamio().args(["run", "exit 4"]).assert().code(4);
}

#[test]
fn test_feed_file_to_command() {
    let ctx = TestContext::new();
    let input = ctx.create_file("input.txt", b"fed through a pipe\n");

    streamio()
        .current_dir(ctx.dir())
        .arg("feed")
        .arg(&input)
        .arg("cat > out.txt")
        .assert()
        .success();

    assert_eq!(ctx.read_file("out.txt"), b"fed through a pipe\n");
}

#[test]
fn test_tell_prints_size() {
    let ctx = TestContext::new();
    let path = ctx.create_file("sized", &pattern(12_345));

    streamio()
        .arg("tell")
        .arg(&path)
        .assert()
        .success()
        .stdout("12345\n");
}

#[test]
fn test_config_file_is_applied() {
    let ctx = TestContext::new();
    let config = ctx.create_file("streamio.toml", b"buffer_capacity = 3\n");
    let src = ctx.create_file("src", b"tiny buffers still copy\n");

    streamio()
        .arg("-c")
        .arg(&config)
        .arg("copy")
        .arg(&src)
        .arg(ctx.path("dst"))
        .assert()
        .success();

    assert_eq!(ctx.read_file("dst"), b"tiny buffers still copy\n");
}

#[test]
fn test_invalid_config_exits_with_code_2() {
    let ctx = TestContext::new();
    let config = ctx.create_file("bad.toml", b"buffer_capacity = 0\n");

    streamio()
        .arg("-c")
        .arg(&config)
        .args(["run", "true"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("[E1003]"));
}

#[test]
fn test_unparsable_config_reports_parse_code() {
    let ctx = TestContext::new();
    let config = ctx.create_file("broken.toml", b"buffer_capacity = [\n");

    streamio()
        .arg("-c")
        .arg(&config)
        .args(["run", "true"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("[E1002]"));
}

#[test]
fn test_missing_config_reports_not_found_code() {
    let ctx = TestContext::new();

    streamio()
        .arg("-c")
        .arg(ctx.path("nowhere.toml"))
        .args(["run", "true"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("[E1001]"));
}
