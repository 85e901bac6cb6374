//! End-to-end tests for the `huybuild` binary.
//!
//! Each test runs against a scratch project root and a scratch config
//! directory so the user's own override file is never read.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

struct Sandbox {
    root: TempDir,
    config_home: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        Self {
            root: tempfile::tempdir().expect("root tempdir"),
            config_home: tempfile::tempdir().expect("config tempdir"),
        }
    }

    fn root(&self) -> &Path {
        self.root.path()
    }

    fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_huybuild"))
            .arg("--root")
            .arg(self.root())
            .args(args)
            .env("XDG_CONFIG_HOME", self.config_home.path())
            .env("NO_COLOR", "1")
            .env_remove("HUYBUILD_LOG")
            .output()
            .expect("failed to run huybuild")
    }

    fn write_state(&self, json: &str) {
        let automation = self.root().join("Automation");
        fs::create_dir_all(&automation).unwrap();
        fs::write(automation.join(".build_state.json"), json).unwrap();
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_help_and_version_exit_zero() {
    let sandbox = Sandbox::new();
    let help = sandbox.run(&["--help"]);
    assert_eq!(help.status.code(), Some(0));
    assert!(stdout(&help).contains("clean-all"));

    let version = sandbox.run(&["--version"]);
    assert_eq!(version.status.code(), Some(0));
    assert!(stdout(&version).contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_unknown_action_or_value_exits_one() {
    let sandbox = Sandbox::new();
    assert_eq!(sandbox.run(&["deploy"]).status.code(), Some(1));
    assert_eq!(sandbox.run(&["-t", "icc", "build"]).status.code(), Some(1));
    assert_eq!(sandbox.run(&["--frobnicate"]).status.code(), Some(1));
}

#[test]
fn test_clean_missing_folder_fails() {
    let sandbox = Sandbox::new();
    let output = sandbox.run(&["clean"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).contains("build-msvc"));
}

#[test]
fn test_clean_removes_current_folder() {
    let sandbox = Sandbox::new();
    fs::create_dir_all(sandbox.root().join("build-mingw").join("bin")).unwrap();

    let output = sandbox.run(&["-t", "mingw", "clean"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(!sandbox.root().join("build-mingw").exists());
}

#[test]
fn test_clean_all_always_succeeds() {
    let sandbox = Sandbox::new();
    fs::create_dir_all(sandbox.root().join("vs-build")).unwrap();
    fs::create_dir_all(sandbox.root().join("Engine")).unwrap();

    let output = sandbox.run(&["clean-all"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(!sandbox.root().join("vs-build").exists());
    assert!(sandbox.root().join("Engine").exists());
    assert!(stdout(&output).contains("cmake-build-minsizerel"));
}

#[test]
fn test_build_without_folder_fails() {
    let sandbox = Sandbox::new();
    let output = sandbox.run(&["build"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).contains("Generate the project first"));
}

#[test]
fn test_run_without_executable_fails() {
    let sandbox = Sandbox::new();
    let output = sandbox.run(&["run"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).contains("Executable not found"));
}

#[test]
fn test_format_without_sources_fails() {
    let sandbox = Sandbox::new();
    let output = sandbox.run(&["format"]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_tools_prints_status() {
    let sandbox = Sandbox::new();
    let output = sandbox.run(&["tools"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains("vcvarsall.bat"));
}

#[test]
fn test_flags_layer_over_persisted_state() {
    let sandbox = Sandbox::new();
    sandbox.write_state(r#"{"current_ide": "CLION", "current_configuration": "DEBUG"}"#);
    fs::create_dir_all(sandbox.root().join("cmake-build-release")).unwrap();
    fs::create_dir_all(sandbox.root().join("cmake-build-debug")).unwrap();

    let output = sandbox.run(&["-c", "Release", "clean"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(!sandbox.root().join("cmake-build-release").exists());
    assert!(sandbox.root().join("cmake-build-debug").exists());

    // flags are not written back
    let state = fs::read_to_string(sandbox.root().join("Automation").join(".build_state.json")).unwrap();
    assert!(state.contains("DEBUG"));
}

#[test]
fn test_corrupt_state_is_ignored() {
    let sandbox = Sandbox::new();
    sandbox.write_state("{ definitely not json");
    fs::create_dir_all(sandbox.root().join("build-msvc")).unwrap();

    let output = sandbox.run(&["clean"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(!sandbox.root().join("build-msvc").exists());
}

#[test]
fn test_user_defaults_apply() {
    let sandbox = Sandbox::new();
    let automation = sandbox.root().join("Automation");
    fs::create_dir_all(&automation).unwrap();
    fs::write(
        automation.join("user_config.toml"),
        "suppress_tool_warnings = true\n[defaults]\nide = \"vs\"\n",
    )
    .unwrap();
    fs::create_dir_all(sandbox.root().join("vs-build")).unwrap();

    let output = sandbox.run(&["clean"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(!sandbox.root().join("vs-build").exists());
}

#[test]
fn test_completions() {
    let sandbox = Sandbox::new();
    let output = sandbox.run(&["--completions", "bash"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains("huybuild"));
}
