//! Exit codes of the `strategy-simulator` binary.

use std::path::PathBuf;
use std::process::Command;

use tempfile::TempDir;

fn simulator() -> Command {
    Command::new(env!("CARGO_BIN_EXE_strategy-simulator"))
}

fn demo(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("demos").join(relative)
}

fn status(command: &mut Command) -> i32 {
    command.output().unwrap().status.code().unwrap()
}

#[test]
fn test_no_arguments_is_usage_error() {
    assert_eq!(status(&mut simulator()), 1);
}

#[test]
fn test_extra_argument_is_usage_error() {
    assert_eq!(status(simulator().args(["a.cfg", "b.cfg"])), 1);
}

#[test]
fn test_help_and_version_succeed() {
    assert_eq!(status(simulator().arg("--help")), 0);
    assert_eq!(status(simulator().arg("--version")), 0);
}

#[test]
fn test_missing_configuration_fails() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("absent.cfg");
    assert_eq!(status(simulator().arg(&missing)), 255);
}

#[test]
fn test_demos_play_through() {
    let dir = TempDir::new().unwrap();
    for config in ["gomoku/gomoku.cfg", "empty/empty.cfg"] {
        let output = simulator().arg(demo(config)).current_dir(dir.path()).output().unwrap();
        assert_eq!(output.status.code(), Some(0), "{config}");
        assert!(String::from_utf8_lossy(&output.stdout).starts_with("Strategy Simulator "));
    }
}
