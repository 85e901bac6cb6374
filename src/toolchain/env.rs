//! Compiler environment for MSVC-flavoured toolchains.
//!
//! Ninja builds with `cl` or `clang-cl` need the variables `vcvarsall.bat`
//! sets up (`PATH`, `INCLUDE`, `LIB`, ...). The script is run once through
//! `cmd`, followed by `set`, and the dump is parsed back into a table.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, warn};

use super::ToolPaths;
use crate::config::BuildSelection;

/// Upper bound on how long `vcvarsall.bat` may run.
pub const VCVARS_TIMEOUT: Duration = Duration::from_secs(30);

const POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Error)]
pub enum EnvSetupError {
    #[error("failed to start environment script: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("environment script timed out after {0:?}")]
    Timeout(Duration),
    #[error("environment script exited with {0}")]
    Failed(std::process::ExitStatus),
    #[error("environment script produced no variables")]
    Empty,
}

/// The current process environment as a plain string table.
pub fn ambient_environment() -> HashMap<String, String> {
    std::env::vars_os()
        .map(|(k, v)| {
            (
                k.to_string_lossy().into_owned(),
                v.to_string_lossy().into_owned(),
            )
        })
        .collect()
}

/// `KEY=VALUE` lines from a `set` dump. Lines without `=` or with an empty
/// key are skipped.
pub fn parse_env_lines(output: &str) -> HashMap<String, String> {
    output
        .lines()
        .filter_map(|line| line.trim_end_matches('\r').split_once('='))
        .filter(|(key, _)| !key.is_empty())
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

/// Runs `command` and returns its stdout, killing it after `timeout`.
pub fn run_with_timeout(mut command: Command, timeout: Duration) -> Result<String, EnvSetupError> {
    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .map_err(EnvSetupError::Spawn)?;

    let mut stdout = child.stdout.take();
    let reader = thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(out) = stdout.as_mut() {
            let _ = out.read_to_end(&mut buf);
        }
        buf
    });

    let started = Instant::now();
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) if started.elapsed() >= timeout => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(EnvSetupError::Timeout(timeout));
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(e) => {
                let _ = child.kill();
                return Err(EnvSetupError::Spawn(e));
            }
        }
    };

    let bytes = reader.join().unwrap_or_default();
    if !status.success() {
        return Err(EnvSetupError::Failed(status));
    }
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn vcvars_command(script: &Path, arch: &str) -> Command {
    let line = format!("/C call \"{}\" {} && set", script.display(), arch);

    #[cfg(windows)]
    {
        use std::os::windows::process::CommandExt;
        let mut cmd = Command::new("cmd");
        cmd.raw_arg(line);
        cmd
    }

    #[cfg(not(windows))]
    {
        let mut cmd = Command::new("cmd");
        cmd.args(line.split_whitespace());
        cmd
    }
}

/// Environment produced by `vcvarsall.bat <arch> && set`.
pub fn load_vcvars_env(
    script: &Path,
    arch: &str,
    timeout: Duration,
) -> Result<HashMap<String, String>, EnvSetupError> {
    let output = run_with_timeout(vcvars_command(script, arch), timeout)?;
    let vars = parse_env_lines(&output);
    if vars.is_empty() {
        return Err(EnvSetupError::Empty);
    }
    Ok(vars)
}

/// Environment for running CMake with the selected toolchain.
///
/// MSVC and Clang-CL get the `vcvarsall.bat` environment for the selected
/// platform. Anything that goes wrong falls back to the ambient environment.
pub fn resolve_compiler_environment(
    sel: &BuildSelection,
    tools: &ToolPaths,
) -> HashMap<String, String> {
    resolve_with_timeout(sel, tools, VCVARS_TIMEOUT)
}

pub fn resolve_with_timeout(
    sel: &BuildSelection,
    tools: &ToolPaths,
    timeout: Duration,
) -> HashMap<String, String> {
    if !sel.toolchain.uses_msvc_environment() {
        return ambient_environment();
    }
    let Some(script) = tools.vcvarsall.as_deref().filter(|p| p.exists()) else {
        debug!("vcvarsall.bat unavailable, using ambient environment");
        return ambient_environment();
    };

    let arch = sel.platform.vcvars_arch();
    match load_vcvars_env(script, arch, timeout) {
        Ok(vars) => {
            debug!(count = vars.len(), arch, "loaded vcvarsall environment");
            vars
        }
        Err(e) => {
            warn!("{}; using ambient environment", e);
            ambient_environment()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Toolchain;
    use std::path::PathBuf;

    #[test]
    fn test_parse_env_lines() {
        let vars = parse_env_lines("Path=C:\\bin;C:\\tools\r\nINCLUDE=C:\\inc\n=C:=C:\\\nnoise\nEMPTY=\n");
        assert_eq!(vars.get("Path").map(String::as_str), Some("C:\\bin;C:\\tools"));
        assert_eq!(vars.get("INCLUDE").map(String::as_str), Some("C:\\inc"));
        assert_eq!(vars.get("EMPTY").map(String::as_str), Some(""));
        assert_eq!(vars.len(), 3);
    }

    #[test]
    fn test_missing_script_gives_ambient_for_every_toolchain() {
        let ambient = ambient_environment();
        for toolchain in [Toolchain::MSVC, Toolchain::ClangCL, Toolchain::MinGW] {
            let sel = BuildSelection {
                toolchain,
                ..BuildSelection::default()
            };
            let tools = ToolPaths {
                vcvarsall: Some(PathBuf::from("/definitely/not/here/vcvarsall.bat")),
                ..ToolPaths::default()
            };
            assert_eq!(resolve_compiler_environment(&sel, &tools), ambient);
            assert_eq!(resolve_compiler_environment(&sel, &ToolPaths::default()), ambient);
        }
    }

    #[test]
    fn test_mingw_never_runs_script() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("vcvarsall.bat");
        std::fs::write(&script, "").unwrap();

        let sel = BuildSelection {
            toolchain: Toolchain::MinGW,
            ..BuildSelection::default()
        };
        let tools = ToolPaths {
            vcvarsall: Some(script),
            ..ToolPaths::default()
        };
        assert_eq!(resolve_compiler_environment(&sel, &tools), ambient_environment());
    }

    #[cfg(unix)]
    #[test]
    fn test_spawn_failure_gives_ambient() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("vcvarsall.bat");
        std::fs::write(&script, "").unwrap();

        let tools = ToolPaths {
            vcvarsall: Some(script),
            ..ToolPaths::default()
        };
        let env = resolve_with_timeout(&BuildSelection::default(), &tools, Duration::from_secs(2));
        assert_eq!(env, ambient_environment());
    }

    #[cfg(unix)]
    #[test]
    fn test_run_with_timeout_collects_output() {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "printf 'A=1\\nB=two\\n'"]);
        let out = run_with_timeout(cmd, Duration::from_secs(10)).unwrap();
        let vars = parse_env_lines(&out);
        assert_eq!(vars.get("B").map(String::as_str), Some("two"));
    }

    #[cfg(unix)]
    #[test]
    fn test_run_with_timeout_kills_slow_process() {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "exec sleep 5"]);
        let started = Instant::now();
        let err = run_with_timeout(cmd, Duration::from_millis(200)).unwrap_err();
        assert!(matches!(err, EnvSetupError::Timeout(_)));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[cfg(unix)]
    #[test]
    fn test_run_with_timeout_reports_failure() {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "exit 3"]);
        let err = run_with_timeout(cmd, Duration::from_secs(10)).unwrap_err();
        assert!(matches!(err, EnvSetupError::Failed(_)));
    }
}
